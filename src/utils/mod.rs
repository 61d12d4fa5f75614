pub mod role_cache;
