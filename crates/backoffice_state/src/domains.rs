use crate::list::{ListDomain, ListState};
use crate::storage::StateStorage;
use crate::store::Store;
use backoffice_types::{
    AnniversaryRewardPolicy, Announcement, Artist, ChartEntry, PointModification, QrCode, User,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

fn flag(params: &mut Vec<(String, String)>, key: &str, enabled: bool) {
    if enabled {
        params.push((key.to_string(), "true".to_string()));
    }
}

fn text(params: &mut Vec<(String, String)>, key: &str, value: &Option<String>) {
    if let Some(value) = value.as_ref().filter(|v| !v.trim().is_empty()) {
        params.push((key.to_string(), value.trim().to_string()));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilters {
    pub search: Option<String>,
    pub banned_only: bool,
}

pub struct UsersDomain;

impl ListDomain for UsersDomain {
    type Item = User;
    type Filters = UserFilters;
    const KEY: &'static str = "users";

    fn item_id(item: &User) -> &str {
        &item.id
    }

    fn filter_params(filters: &UserFilters) -> Vec<(String, String)> {
        let mut params = Vec::new();
        text(&mut params, "search", &filters.search);
        flag(&mut params, "banned", filters.banned_only);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeFilters {
    pub campaign: Option<String>,
    pub active_only: bool,
}

pub struct QrCodesDomain;

impl ListDomain for QrCodesDomain {
    type Item = QrCode;
    type Filters = QrCodeFilters;
    const KEY: &'static str = "qr-codes";

    fn item_id(item: &QrCode) -> &str {
        &item.id
    }

    fn filter_params(filters: &QrCodeFilters) -> Vec<(String, String)> {
        let mut params = Vec::new();
        text(&mut params, "campaign", &filters.campaign);
        flag(&mut params, "active", filters.active_only);
        params
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartPeriod {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartPeriod::Daily => write!(f, "daily"),
            ChartPeriod::Weekly => write!(f, "weekly"),
            ChartPeriod::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartFilters {
    pub period: ChartPeriod,
    pub artist_id: Option<String>,
}

pub struct ChartsDomain;

impl ListDomain for ChartsDomain {
    type Item = ChartEntry;
    type Filters = ChartFilters;
    const KEY: &'static str = "charts";
    // dashboards refetch on open, persisted charts are only restored on request
    const AUTO_REHYDRATE: bool = false;
    const DEFAULT_PAGE_SIZE: u32 = 100;

    fn item_id(item: &ChartEntry) -> &str {
        &item.id
    }

    fn filter_params(filters: &ChartFilters) -> Vec<(String, String)> {
        let mut params = vec![("period".to_string(), filters.period.to_string())];
        text(&mut params, "artistId", &filters.artist_id);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementFilters {
    pub pinned_only: bool,
}

pub struct AnnouncementsDomain;

impl ListDomain for AnnouncementsDomain {
    type Item = Announcement;
    type Filters = AnnouncementFilters;
    const KEY: &'static str = "announcements";

    fn item_id(item: &Announcement) -> &str {
        &item.id
    }

    fn filter_params(filters: &AnnouncementFilters) -> Vec<(String, String)> {
        let mut params = Vec::new();
        flag(&mut params, "pinned", filters.pinned_only);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistFilters {
    pub search: Option<String>,
}

pub struct ArtistsDomain;

impl ListDomain for ArtistsDomain {
    type Item = Artist;
    type Filters = ArtistFilters;
    const KEY: &'static str = "artists";

    fn item_id(item: &Artist) -> &str {
        &item.id
    }

    fn filter_params(filters: &ArtistFilters) -> Vec<(String, String)> {
        let mut params = Vec::new();
        text(&mut params, "search", &filters.search);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointModificationFilters {
    pub user_id: Option<String>,
}

pub struct PointModificationsDomain;

impl ListDomain for PointModificationsDomain {
    type Item = PointModification;
    type Filters = PointModificationFilters;
    const KEY: &'static str = "point-modifications";
    const AUTO_REHYDRATE: bool = false;

    fn item_id(item: &PointModification) -> &str {
        &item.id
    }

    fn filter_params(filters: &PointModificationFilters) -> Vec<(String, String)> {
        let mut params = Vec::new();
        text(&mut params, "userId", &filters.user_id);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardPolicyFilters {
    pub active_only: bool,
}

pub struct RewardPoliciesDomain;

impl ListDomain for RewardPoliciesDomain {
    type Item = AnniversaryRewardPolicy;
    type Filters = RewardPolicyFilters;
    const KEY: &'static str = "anniversary-rewards";

    fn item_id(item: &AnniversaryRewardPolicy) -> &str {
        &item.id
    }

    fn filter_params(filters: &RewardPolicyFilters) -> Vec<(String, String)> {
        let mut params = Vec::new();
        flag(&mut params, "active", filters.active_only);
        params
    }
}

pub type UsersStore = Store<ListState<UsersDomain>>;
pub type QrCodesStore = Store<ListState<QrCodesDomain>>;
pub type ChartsStore = Store<ListState<ChartsDomain>>;
pub type AnnouncementsStore = Store<ListState<AnnouncementsDomain>>;
pub type ArtistsStore = Store<ListState<ArtistsDomain>>;
pub type PointModificationsStore = Store<ListState<PointModificationsDomain>>;
pub type RewardPoliciesStore = Store<ListState<RewardPoliciesDomain>>;

/// Every domain store, built over one storage backend and handed to the
/// pages that need them. The stores do not share any state with each other.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<UsersStore>,
    pub qr_codes: Arc<QrCodesStore>,
    pub charts: Arc<ChartsStore>,
    pub announcements: Arc<AnnouncementsStore>,
    pub artists: Arc<ArtistsStore>,
    pub point_modifications: Arc<PointModificationsStore>,
    pub reward_policies: Arc<RewardPoliciesStore>,
}

impl Stores {
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        Self {
            users: Arc::new(Store::new(storage.clone())),
            qr_codes: Arc::new(Store::new(storage.clone())),
            charts: Arc::new(Store::new(storage.clone())),
            announcements: Arc::new(Store::new(storage.clone())),
            artists: Arc::new(Store::new(storage.clone())),
            point_modifications: Arc::new(Store::new(storage.clone())),
            reward_policies: Arc::new(Store::new(storage)),
        }
    }
}
