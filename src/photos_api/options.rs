//! Request options resolution.
//!
//! Options structs use `Option` for every field. A request starts from the
//! documented defaults and every field the caller set to `Some` replaces the
//! default, zero and `false` included.

use serde::Serialize;

use crate::photos_api::DEFAULT_PAGE_SIZE;

/// Options with package defaults that caller values are laid over field by field.
pub trait RequestOptions: Clone + Default {
    fn defaults() -> Self;

    /// Overlay every field set in `caller` on top of `self`.
    fn overlay(self, caller: &Self) -> Self;
}

/// Resolve the options for one request.
pub fn resolve<O: RequestOptions>(caller: Option<&O>) -> O {
    match caller {
        Some(caller) => O::defaults().overlay(caller),
        None => O::defaults(),
    }
}

/// Query options for listing albums and shared albums.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlbumsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_non_app_created_data: Option<bool>,
}

impl RequestOptions for ListAlbumsOptions {
    fn defaults() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE),
            exclude_non_app_created_data: None,
        }
    }

    fn overlay(self, caller: &Self) -> Self {
        Self {
            page_size: caller.page_size.or(self.page_size),
            exclude_non_app_created_data: caller
                .exclude_non_app_created_data
                .or(self.exclude_non_app_created_data),
        }
    }
}

/// Query options for listing media items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMediaItemsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl RequestOptions for ListMediaItemsOptions {
    fn defaults() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }

    fn overlay(self, caller: &Self) -> Self {
        Self {
            page_size: caller.page_size.or(self.page_size),
        }
    }
}

/// Comma-separated field names for an `updateMask` query parameter.
pub(crate) fn update_mask<F: Serialize>(fields: &[F]) -> String {
    fields
        .iter()
        .filter_map(|field| match serde_variant::to_variant_name(field) {
            Ok(name) => Some(name),
            Err(e) => {
                log::warn!("Skipping update mask field without a variant name: {e:?}");
                None
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Wraps resolved options with the page token of one request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WithPageToken<'a, O> {
    #[serde(flatten)]
    pub options: &'a O,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub page_token: &'a str,
}
