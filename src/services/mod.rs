// SPDX-License-Identifier: MIT

//! External-service clients and catalog transformation.

pub mod catalog;
pub mod killbill;
pub mod supabase;

pub use killbill::KillbillClient;
pub use supabase::SupabaseClient;
