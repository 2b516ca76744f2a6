//! Command handlers organized by category.
//!
//! | Module | Commands |
//! |--------|----------|
//! | `index` | CreateIndex, DropIndex, Info, DebugTtl, DebugGcForceInvoke |
//! | `query` | Search, Aggregate |
//! | `config` | ConfigGet, ConfigSet |
//! | `document` | HSet, JsonSet, Del, Expire, Persist |

pub mod config;
pub mod document;
pub mod index;
pub mod query;
