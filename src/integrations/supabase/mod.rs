// src/integrations/supabase/mod.rs
//
// Hosted Postgres backend reached through its PostgREST gateway

pub mod client;
pub mod column_mapping;

pub use client::{SupabaseClient, COFFEE_TABLE, CONFIG_TABLE, REPLACE_ALL_FUNCTION};
pub use column_mapping::{
    entry_from_remote, patch_to_remote, to_local_casing, to_remote_casing, RemoteRecord,
};
