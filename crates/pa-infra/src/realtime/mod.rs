mod local_hub;
mod phoenix;
mod supabase;

pub use local_hub::LocalRealtimeHub;
pub use supabase::SupabaseRealtime;

/// Buffer between a transport task and the subscriber's receiver.
const SUBSCRIPTION_BUFFER: usize = 32;
