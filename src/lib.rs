pub mod core {
    pub mod config;
    pub mod error;
    pub mod routes;
    pub mod startup;
    pub mod state;
    pub mod tracing_init;
}

pub mod engine;

pub mod handlers {
    pub mod config;
    pub mod fallback;
    pub mod health;
    pub mod ignore;
    pub mod metrics;
    pub mod run;
}

pub mod metrics {
    pub mod collector;
}

pub mod models {
    pub mod admin;
    pub mod policy;
    pub mod torrent;
}

pub mod policy {
    pub mod ranking;
    pub mod remover;
    pub mod rules;
    pub mod selection;
    pub mod service;
}

pub mod scheduler;

pub mod stores {
    pub mod document;
    pub mod ignore_store;
    pub mod policy_store;
}

pub mod utils {
    pub mod auth;
    pub mod time;
}
