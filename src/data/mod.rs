/// Data layer: core types, loading, repair, coercion and filtering.
///
/// Architecture:
/// ```text
///   lab export (.csv, maybe tab / \t mangled)
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  loader   │ ───▶ │  detect   │  Verdict: Clean / Malformed(sig)
///   └──────────┘      └──────────┘
///        ▲                  │ malformed
///        │                  ▼
///        │            ┌───────────┐
///        └─────────── │ normalize  │  normalized/<stem>_comma.csv
///                     └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   Table   │  named columns, rectangular
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  numeric  │ ───▶ │  filter   │  predicate → new Table
///   └──────────┘      └──────────┘
/// ```
/// `ingest` strings loader, detect and normalize together.

pub mod detect;
pub mod filter;
pub mod ingest;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod numeric;
