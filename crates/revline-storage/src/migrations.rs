// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded refinery migrations, compiled in from `migrations/`.

use revline_core::RevlineError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Applies pending migrations. Refinery records applied versions in
/// `refinery_schema_history`, so this is safe to call on every start.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<usize, RevlineError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| RevlineError::Storage {
            source: e.to_string().into(),
        })?;
    Ok(report.applied_migrations().len())
}
