// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod catalog;
pub mod coffee_service;
pub mod pin_service;
pub mod statistics_service;
pub mod transfer_service;


// Re-export all services and their types
pub use coffee_service::{
    group_slug,
    CoffeeService,
    DeleteOutcome,
    Loaded,
    MigrationReport,
};

pub use catalog::{
    group_by_roaster,
    group_variations,
    run_query,
    CatalogQuery,
    RoasterGroup,
    SortKey,
    VariationGroup,
};

pub use statistics_service::{
    compute_statistics,
    StatisticsService,
};

pub use transfer_service::{
    default_collection,
    export_document,
    parse_import,
    ExportDocument,
    ImportMode,
    ImportReport,
    TransferService,
};

pub use pin_service::{
    hash_pin,
    PinService,
};
