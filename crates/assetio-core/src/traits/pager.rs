// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paged relationship query results.

use crate::error::AssetIoError;
use crate::traits::host::HostSession;
use crate::types::EntityReference;

/// A cursor over pages of entity references, implemented by managers.
///
/// `close` is invoked by the host wrapper when its last owner releases it;
/// implementations release any per-query resources there.
pub trait EntityReferencePagerInterface: Send {
    /// Whether a page follows the current one.
    fn has_next(&mut self, host: &HostSession) -> Result<bool, AssetIoError>;

    /// References in the current page.
    fn get(&mut self, host: &HostSession) -> Result<Vec<EntityReference>, AssetIoError>;

    /// Advances to the next page. Past the last page, `get` returns an empty page.
    fn next(&mut self, host: &HostSession) -> Result<(), AssetIoError>;

    fn close(&mut self, _host: &HostSession) -> Result<(), AssetIoError> {
        Ok(())
    }
}

/// A pager with no data and no further pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyPager;

impl EntityReferencePagerInterface for EmptyPager {
    fn has_next(&mut self, _host: &HostSession) -> Result<bool, AssetIoError> {
        Ok(false)
    }

    fn get(&mut self, _host: &HostSession) -> Result<Vec<EntityReference>, AssetIoError> {
        Ok(Vec::new())
    }

    fn next(&mut self, _host: &HostSession) -> Result<(), AssetIoError> {
        Ok(())
    }
}
