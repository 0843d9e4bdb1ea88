// src/lib.rs
// Coffee Tracker - Local-first coffee tasting log
//
// Architecture:
// - Domain-centric: entries, invariants and derived metrics live in domain
// - Explicit: backends are injected, never global
// - Local-first: the SQLite snapshot always works, the remote backend is optional
// - Application Layer: command-line boundary

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    cost_per_cup,
    grams_for_method,
    grams_per_cup,
    price_per_kg,
    validate_entry,
    validate_patch,
    value_score,
    BrewingMethod,
    // Coffee
    CoffeeEntry,
    CoffeePatch,
    // Statistics
    CollectionStatistics,
    Currency,
    RoastLevel,
    TasteProfile,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Configuration
// ============================================================================

pub use config::{AppConfig, RemoteSettings};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    KeyValueStore,
    LocalSnapshotRepository,
    RemoteCoffeeRepository,
    RemoteConfigRepository,
    SnapshotRepository,
    SqliteKeyValueStore,
    StorageInfo,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    CatalogQuery,
    // Coffee Service
    CoffeeService,
    DeleteOutcome,
    ExportDocument,
    ImportMode,
    Loaded,
    // PIN gate
    PinService,
    SortKey,
    // Statistics Service
    StatisticsService,
    // Transfer Service
    TransferService,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;

// Re-export application submodules
pub use application::commands;
pub use application::dto;

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::supabase::{to_local_casing, to_remote_casing};
pub use integrations::SupabaseClient;
