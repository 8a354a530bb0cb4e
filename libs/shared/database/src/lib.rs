pub mod supabase;

pub use supabase::{is_conflict, StoreError, SupabaseClient};
