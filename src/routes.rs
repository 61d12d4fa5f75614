use crate::{
    api::{dashboard, manpower_request},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::Context;
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Built once and shared by every worker so limits are per process.
#[derive(Clone)]
pub struct RateLimiters {
    protected: Limiter,
    decide: Limiter,
}

impl RateLimiters {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            protected: build_limiter(config.rate_protected_per_min)
                .context("RATE_PROTECTED_PER_MIN")?,
            decide: build_limiter(config.rate_decide_per_min).context("RATE_DECIDE_PER_MIN")?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limit")?;
    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &RateLimiters) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(limiters.protected.clone()) // rate limiting
            .service(
                web::scope("/requests")
                    // /requests
                    .service(
                        web::resource("")
                            .route(web::get().to(manpower_request::list_requests))
                            .route(web::post().to(manpower_request::create_request)),
                    )
                    // /requests/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(manpower_request::get_request))
                            .route(web::delete().to(manpower_request::withdraw_request)),
                    )
                    // /requests/{id}/submit
                    .service(
                        web::resource("/{id}/submit")
                            .route(web::post().to(manpower_request::submit_request)),
                    )
                    // /requests/{id}/decide
                    .service(
                        web::resource("/{id}/decide")
                            .wrap(limiters.decide.clone())
                            .route(web::post().to(manpower_request::decide_request)),
                    ),
            )
            .service(
                web::scope("/dashboard").service(
                    web::resource("/overview").route(web::get().to(dashboard::dashboard_overview)),
                ),
            ),
    );
}
