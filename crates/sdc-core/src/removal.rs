//! Removal requests handed to the host's data-deletion capability

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Browsing data categories that can be removed
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DataTypes: u16 {
        /// HTTP cache
        const CACHE = 1 << 0;
        /// Cache API storage
        const CACHE_STORAGE = 1 << 1;
        /// Cookies
        const COOKIES = 1 << 2;
        /// File system API data
        const FILE_SYSTEMS = 1 << 3;
        /// IndexedDB databases
        const INDEXED_DB = 1 << 4;
        /// `localStorage`
        const LOCAL_STORAGE = 1 << 5;
        /// Service worker registrations
        const SERVICE_WORKERS = 1 << 6;
        /// WebSQL databases
        const WEB_SQL = 1 << 7;
    }
}

/// A single data category, as named by the browsing-data API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataCategory {
    /// HTTP cache
    Cache,
    /// Cache API storage
    CacheStorage,
    /// Cookies
    Cookies,
    /// File system API data
    FileSystems,
    /// IndexedDB databases
    #[serde(rename = "indexedDB")]
    IndexedDb,
    /// `localStorage`
    LocalStorage,
    /// Service worker registrations
    ServiceWorkers,
    /// WebSQL databases
    #[serde(rename = "webSQL")]
    WebSql,
}

impl DataCategory {
    /// Every category
    pub const ALL: [DataCategory; 8] = [
        DataCategory::Cache,
        DataCategory::CacheStorage,
        DataCategory::Cookies,
        DataCategory::FileSystems,
        DataCategory::IndexedDb,
        DataCategory::LocalStorage,
        DataCategory::ServiceWorkers,
        DataCategory::WebSql,
    ];

    /// The flag for this category
    pub fn flag(self) -> DataTypes {
        match self {
            DataCategory::Cache => DataTypes::CACHE,
            DataCategory::CacheStorage => DataTypes::CACHE_STORAGE,
            DataCategory::Cookies => DataTypes::COOKIES,
            DataCategory::FileSystems => DataTypes::FILE_SYSTEMS,
            DataCategory::IndexedDb => DataTypes::INDEXED_DB,
            DataCategory::LocalStorage => DataTypes::LOCAL_STORAGE,
            DataCategory::ServiceWorkers => DataTypes::SERVICE_WORKERS,
            DataCategory::WebSql => DataTypes::WEB_SQL,
        }
    }

    /// Name used by the browsing-data API
    pub fn api_name(self) -> &'static str {
        match self {
            DataCategory::Cache => "cache",
            DataCategory::CacheStorage => "cacheStorage",
            DataCategory::Cookies => "cookies",
            DataCategory::FileSystems => "fileSystems",
            DataCategory::IndexedDb => "indexedDB",
            DataCategory::LocalStorage => "localStorage",
            DataCategory::ServiceWorkers => "serviceWorkers",
            DataCategory::WebSql => "webSQL",
        }
    }
}

impl DataTypes {
    /// Site data removed when a domain is destroyed without its cookies
    pub fn site_data() -> Self {
        DataTypes::CACHE
            | DataTypes::CACHE_STORAGE
            | DataTypes::FILE_SYSTEMS
            | DataTypes::INDEXED_DB
            | DataTypes::LOCAL_STORAGE
            | DataTypes::SERVICE_WORKERS
    }

    /// Everything, used by the startup reset
    pub fn full_reset() -> Self {
        DataTypes::all()
    }

    /// Collect flags from a list of categories
    pub fn from_categories<'a>(categories: impl IntoIterator<Item = &'a DataCategory>) -> Self {
        categories
            .into_iter()
            .fold(DataTypes::empty(), |acc, category| acc | category.flag())
    }

    /// The categories contained in this set
    pub fn categories(self) -> Vec<DataCategory> {
        DataCategory::ALL
            .into_iter()
            .filter(|category| self.contains(category.flag()))
            .collect()
    }
}

impl fmt::Display for DataTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.categories().iter().map(|c| c.api_name()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Which sites a removal applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalScope {
    /// Only these origins (`https://example.com`)
    Origins(Vec<String>),
    /// Only these hostnames (`example.com`)
    Hostnames(Vec<String>),
    /// Every origin except these
    ExcludeOrigins(Vec<String>),
}

impl RemovalScope {
    /// Entries of the scope, whatever its kind
    pub fn entries(&self) -> &[String] {
        match self {
            RemovalScope::Origins(list)
            | RemovalScope::Hostnames(list)
            | RemovalScope::ExcludeOrigins(list) => list,
        }
    }
}

impl fmt::Display for RemovalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalScope::Origins(list) => write!(f, "origins [{}]", list.join(", ")),
            RemovalScope::Hostnames(list) => write!(f, "hostnames [{}]", list.join(", ")),
            RemovalScope::ExcludeOrigins(list) => {
                write!(f, "all except {} origins", list.len())
            }
        }
    }
}

/// One call to the data-deletion capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalRequest {
    /// Sites to remove data for
    pub scope: RemovalScope,
    /// Categories to remove
    pub data_types: DataTypes,
}

impl RemovalRequest {
    /// Create a request
    pub fn new(scope: RemovalScope, data_types: DataTypes) -> Self {
        Self { scope, data_types }
    }

    /// Whether cookies are part of this request
    pub fn includes_cookies(&self) -> bool {
        self.data_types.contains(DataTypes::COOKIES)
    }
}
