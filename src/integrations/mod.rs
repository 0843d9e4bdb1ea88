// src/integrations/mod.rs
//
// External Integrations Module
//
// Each integration implements a repository contract from `crate::repositories`.

pub mod supabase;

pub use supabase::SupabaseClient;
