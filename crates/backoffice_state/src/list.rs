use crate::store::StoreState;
use backoffice_types::{ListQuery, Page};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes one paginated console domain: its record type, its filters and
/// where its state is persisted.
pub trait ListDomain: Send + Sync + 'static {
    type Item: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + 'static;
    type Filters: Clone + Default + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + 'static;

    const KEY: &'static str;
    const AUTO_REHYDRATE: bool = true;
    const DEFAULT_PAGE_SIZE: u32 = 20;

    fn item_id(item: &Self::Item) -> &str;

    /// Query parameters for the active filters
    fn filter_params(filters: &Self::Filters) -> Vec<(String, String)>;
}

/// Last fetched page of a domain plus the pagination and filter inputs that
/// produced it.
pub struct ListState<D: ListDomain> {
    pub items: Vec<D::Item>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub filters: D::Filters,
    pub loading: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedListState<I, F> {
    pub items: Vec<I>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub filters: F,
}

impl<D: ListDomain> Default for ListState<D> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size: D::DEFAULT_PAGE_SIZE,
            filters: D::Filters::default(),
            loading: false,
            last_error: None,
        }
    }
}

impl<D: ListDomain> Clone for ListState<D> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            filters: self.filters.clone(),
            loading: self.loading,
            last_error: self.last_error.clone(),
        }
    }
}

impl<D: ListDomain> fmt::Debug for ListState<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListState")
            .field("key", &D::KEY)
            .field("items", &self.items)
            .field("total", &self.total)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("filters", &self.filters)
            .field("loading", &self.loading)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl<D: ListDomain> ListState<D> {
    /// Query for the current page and filters
    pub fn query(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            page_size: self.page_size,
            search: None,
            filters: D::filter_params(&self.filters),
        }
    }

    pub fn apply_page(&mut self, page: Page<D::Item>) {
        self.items = page.items;
        self.total = page.total;
    }

    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Changing filters starts over from the first page
    pub fn set_filters(&mut self, filters: D::Filters) {
        if self.filters != filters {
            self.filters = filters;
            self.page = 1;
        }
    }

    /// Insert a created record at the top, or replace an updated one in place
    pub fn upsert(&mut self, item: D::Item) {
        match self
            .items
            .iter()
            .position(|existing| D::item_id(existing) == D::item_id(&item))
        {
            Some(index) => self.items[index] = item,
            None => {
                self.items.insert(0, item);
                self.total += 1;
            }
        }
    }

    /// Swap in an updated record if it is on the current page
    pub fn replace(&mut self, item: D::Item) -> bool {
        match self
            .items
            .iter_mut()
            .find(|existing| D::item_id(existing) == D::item_id(&item))
        {
            Some(existing) => {
                *existing = item;
                true
            }
            None => false,
        }
    }

    /// Drop a deleted record. Returns whether it was on the current page
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| D::item_id(item) != id);
        let removed = self.items.len() != before;
        if removed {
            self.total = self.total.saturating_sub(1);
        }
        removed
    }
}

impl<D: ListDomain> StoreState for ListState<D> {
    type Persisted = PersistedListState<D::Item, D::Filters>;

    const KEY: &'static str = D::KEY;
    const AUTO_REHYDRATE: bool = D::AUTO_REHYDRATE;

    fn persisted(&self) -> Self::Persisted {
        PersistedListState {
            items: self.items.clone(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            filters: self.filters.clone(),
        }
    }

    fn restore(persisted: Self::Persisted) -> Self {
        Self {
            items: persisted.items,
            total: persisted.total,
            page: persisted.page.max(1),
            page_size: if persisted.page_size == 0 {
                D::DEFAULT_PAGE_SIZE
            } else {
                persisted.page_size
            },
            filters: persisted.filters,
            loading: false,
            last_error: None,
        }
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}
