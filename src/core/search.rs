// src/core/search.rs

//! # Project Search
//!
//! The query pipeline behind every listing: gather the recent projects of
//! every configured history root, narrow them by product and text, order them
//! by recency and attach the launcher that opens each one.
//!
//! Queries are cooperative with respect to cancellation. A [`QueryCoordinator`]
//! hands each new query a fresh [`CancellationToken`] and trips the previous
//! one; the pipeline checks its token between coarse steps and stops with
//! [`SearchError::Cancelled`] once a newer query has taken over.

use crate::CancellationToken;
use crate::constants::CACHE_TTL;
use crate::core::cache::TimedCache;
use crate::core::catalog::ProductCatalog;
use crate::core::reconcile::{self, ShellResolver};
use crate::core::{history, locator};
use crate::models::{
    LaunchableProject, ProductFilter, ProductRecord, ProjectEntry, ProjectRecord, Recency,
    Settings,
};
use std::cmp::Reverse;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Why a query produced no result list.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SearchError {
    /// A newer query tripped this query's token.
    #[error("The query was superseded by a newer one.")]
    Cancelled,
}

/// What the user typed, and which products the listing is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectQuery {
    pub text: String,
    pub filter: ProductFilter,
}

impl ProjectQuery {
    pub fn new(text: impl Into<String>, filter: ProductFilter) -> Self {
        Self {
            text: text.into(),
            filter,
        }
    }
}

/// The top-level entries of one history file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastOpened {
    pub history_file: PathBuf,
    pub last_opened_project: Option<String>,
    pub last_project_location: Option<String>,
}

/// Owns the settings and every cache a front end needs to list and launch projects.
#[derive(Debug)]
pub struct SearchService {
    settings: Settings,
    catalog: ProductCatalog,
    shells: ShellResolver,
    merged: TimedCache<ProductFilter, Vec<LaunchableProject>>,
}

impl SearchService {
    pub fn new(settings: Settings) -> Self {
        Self::with_ttl(settings, CACHE_TTL)
    }

    pub fn with_ttl(settings: Settings, ttl: Duration) -> Self {
        Self {
            settings,
            catalog: ProductCatalog::with_ttl(ttl),
            shells: ShellResolver::with_ttl(ttl),
            merged: TimedCache::new(ttl),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// Every project recorded by every product under the history roots.
    pub fn recent_projects(&self) -> Vec<ProjectRecord> {
        self.history_files()
            .iter()
            .flat_map(|file| history::parse_file(file))
            .collect()
    }

    /// Every product installed under the install roots.
    pub fn installed_products(&self) -> Vec<ProductRecord> {
        self.settings
            .install_roots()
            .iter()
            .flat_map(|root| self.catalog.get_installed_products(root))
            .collect()
    }

    /// The launch command for a product code, or `None` when neither a
    /// Toolbox script nor an installed launcher exists.
    pub fn launcher_for(&self, product_code: &str) -> Option<String> {
        let scripts_dir = self.settings.shell_scripts_dir();
        self.shells.resolve_shell_for_product_code(
            product_code,
            scripts_dir.as_deref(),
            &self.settings.install_roots(),
            &self.catalog,
        )
    }

    /// Runs the query pipeline. Entries whose launcher cannot be resolved are
    /// kept, with `launcher` set to `None`.
    pub fn search(
        &self,
        query: &ProjectQuery,
        token: &CancellationToken,
    ) -> Result<Vec<ProjectEntry>, SearchError> {
        let projects = self.recent_projects();
        check_cancelled(token)?;

        let mut projects = filter_by_text(filter_by_product(projects, &query.filter), &query.text);
        check_cancelled(token)?;

        sort_by_recency(&mut projects);
        log::debug!("Query '{}' matched {} project(s)", query.text, projects.len());

        let mut entries = Vec::with_capacity(projects.len());
        for project in projects {
            check_cancelled(token)?;
            let launcher = self.launcher_for(&project.product_code);
            entries.push(ProjectEntry { project, launcher });
        }
        Ok(entries)
    }

    /// Recent projects joined with the installed builds that can open them,
    /// most recent first. Results are cached per filter; concurrent callers
    /// for the same filter wait for one computation, and a cancelled one
    /// caches nothing.
    pub fn launchable_projects(
        &self,
        filter: &ProductFilter,
        token: &CancellationToken,
    ) -> Result<Vec<LaunchableProject>, SearchError> {
        self.merged.get_or_try_insert_with(filter.clone(), || {
            let projects = filter_by_product(self.recent_projects(), filter);
            check_cancelled(token)?;

            let products = self.installed_products();
            check_cancelled(token)?;

            let mut merged = reconcile::merge_projects_and_products(
                &projects,
                &products,
                self.settings.match_policy,
            );
            sort_by_recency(&mut merged);
            Ok(merged)
        })
    }

    /// `lastOpenedProject` and `lastProjectLocation` of every history file.
    pub fn last_opened(&self) -> Vec<LastOpened> {
        self.history_files()
            .into_iter()
            .map(|file| LastOpened {
                last_opened_project: history::get_last_opened_project_path(&file),
                last_project_location: history::get_last_project_location(&file),
                history_file: file,
            })
            .collect()
    }

    /// Drops every cached scan, launcher and merged list.
    pub fn invalidate(&self) {
        self.catalog.invalidate();
        self.shells.invalidate();
        self.merged.clear();
    }

    fn history_files(&self) -> Vec<PathBuf> {
        self.settings
            .history_roots()
            .iter()
            .flat_map(|(root, layout)| locator::find_history_files(root, *layout))
            .collect()
    }
}

fn check_cancelled(token: &CancellationToken) -> Result<(), SearchError> {
    if token.load(Ordering::SeqCst) {
        log::debug!("Query cancelled.");
        return Err(SearchError::Cancelled);
    }
    Ok(())
}

/// Keeps the projects recorded by a product the filter accepts.
pub fn filter_by_product(projects: Vec<ProjectRecord>, filter: &ProductFilter) -> Vec<ProjectRecord> {
    projects
        .into_iter()
        .filter(|p| filter.matches(&p.product_code, &p.build_string))
        .collect()
}

/// Keeps the projects whose display name, frame title or path contains
/// `text`, ignoring case. Blank text keeps everything.
pub fn filter_by_text(projects: Vec<ProjectRecord>, text: &str) -> Vec<ProjectRecord> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return projects;
    }

    projects
        .into_iter()
        .filter(|p| {
            [&p.display_name, &p.frame_title, &p.path_key]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Open projects first, then by last activity, newest first. Stable.
pub fn sort_by_recency<T: Recency>(items: &mut [T]) {
    items.sort_by_key(|item| (Reverse(item.is_opened()), Reverse(item.last_activity())));
}

/// Makes sure at most one query is live: starting a query cancels the last one.
#[derive(Debug, Default)]
pub struct QueryCoordinator {
    current: Mutex<Option<CancellationToken>>,
}

impl QueryCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the previous query, if any, and returns the token of the new one.
    pub fn begin(&self) -> CancellationToken {
        let token: CancellationToken = Arc::new(AtomicBool::new(false));
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::clone(&token));

        if let Some(previous) = previous {
            previous.store(true, Ordering::SeqCst);
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::current_platform_os;
    use crate::core::paths;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn record(key: &str, opened: bool, activation: i64, open: i64) -> ProjectRecord {
        ProjectRecord {
            path_key: key.to_string(),
            display_name: key.to_string(),
            is_opened: opened,
            activation_timestamp: activation,
            project_open_timestamp: open,
            ..Default::default()
        }
    }

    fn history_entry(key: &str, title: &str, build: &str, ts: i64, opened: bool) -> String {
        format!(
            r#"<entry key="{key}"><value><RecentProjectMetaInfo frameTitle="{title}">
                 <option name="build" value="{build}"/>
                 <option name="activationTimestamp" value="{ts}"/>
                 <option name="opened" value="{opened}"/>
               </RecentProjectMetaInfo></value></entry>"#
        )
    }

    fn write_history(product_dir: &Path, entries: &[String], last_opened: &str) {
        let options = product_dir.join("config").join("options");
        fs::create_dir_all(&options).unwrap();
        let xml = format!(
            r#"<application><component name="RecentProjectsManager">
                 <option name="additionalInfo"><map>{}</map></option>
                 <option name="lastOpenedProject" value="{last_opened}"/>
               </component></application>"#,
            entries.concat()
        );
        fs::write(options.join("recentProjects.xml"), xml).unwrap();
    }

    fn write_product(root: &Path, dir: &str, code: &str, build: &str) -> PathBuf {
        let product_dir = root.join(dir);
        fs::create_dir_all(product_dir.join("bin")).unwrap();
        let json = format!(
            r#"{{"name": "{dir}", "buildNumber": "{build}", "productCode": "{code}",
                 "launch": [{{"os": "{}", "launcherPath": "bin/launcher"}}]}}"#,
            current_platform_os()
        );
        fs::write(product_dir.join("product-info.json"), json).unwrap();
        fs::write(product_dir.join("bin/launcher"), "").unwrap();
        product_dir
    }

    /// A custom-layout machine with IntelliJ IDEA and PhpStorm installed and
    /// history for IDEA, PhpStorm and an uninstalled GoLand.
    fn fixture() -> (TempDir, SearchService) {
        let tmp = TempDir::new().unwrap();
        let apps = tmp.path().join("apps");
        let data = tmp.path().join("data");
        let scripts = tmp.path().join("scripts");
        fs::create_dir_all(&scripts).unwrap();

        write_product(&apps, "idea", "IU", "252.23892.409");
        write_product(&apps, "phpstorm", "PS", "252.100.1");

        write_history(
            &data.join("IntelliJIdea2025.2"),
            &[
                history_entry("E:/work/amp", "amp – pom.xml (amp)", "IU-252.23892.409", 300, false),
                history_entry("E:/work/api", "api", "IU-252.23892.409", 100, true),
            ],
            "E:/work/amp",
        );
        write_history(
            &data.join("PhpStorm2025.2"),
            &[history_entry("E:/web/shop", "shop", "PS-252.100.1", 200, false)],
            "E:/web/shop",
        );
        write_history(
            &data.join("GoLand2025.2"),
            &[history_entry("E:/go/tool", "tool", "GO-252.5.5", 400, false)],
            "",
        );

        let settings = Settings {
            tools_install_location: paths::normalize_path(&apps),
            system_config_logs_location: paths::normalize_path(&data),
            shell_scripts_location: paths::normalize_path(&scripts),
            jetbrains_custom_option: true,
            ..Default::default()
        };
        (tmp, SearchService::new(settings))
    }

    fn fresh_token() -> CancellationToken {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn test_sort_puts_open_projects_first_then_newest() {
        let mut items = vec![
            record("a", false, 10, 0),
            record("b", true, 1, 0),
            record("c", false, 0, 50),
            record("d", true, 5, 7),
        ];
        sort_by_recency(&mut items);
        let keys: Vec<&str> = items.iter().map(|p| p.path_key.as_str()).collect();
        assert_eq!(keys, vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_text_filter_checks_name_title_and_key() {
        let mut titled = record("E:/x/one", false, 0, 0);
        titled.display_name = "one".to_string();
        titled.frame_title = "Shop – index.php".to_string();
        let plain = record("E:/x/two", false, 0, 0);

        let hits = filter_by_text(vec![titled.clone(), plain.clone()], "SHOP");
        assert_eq!(hits, vec![titled.clone()]);
        assert_eq!(filter_by_text(vec![titled, plain], "  ").len(), 2);
    }

    #[test]
    fn test_search_lists_every_history_root_in_recency_order() {
        let (_tmp, service) = fixture();
        let entries = service.search(&ProjectQuery::default(), &fresh_token()).unwrap();

        let keys: Vec<&str> = entries.iter().map(|e| e.project.path_key.as_str()).collect();
        assert_eq!(keys, vec!["E:/work/api", "E:/go/tool", "E:/work/amp", "E:/web/shop"]);
        assert_eq!(entries[2].project.display_name, "amp");
    }

    #[test]
    fn test_search_marks_uninstalled_products_unavailable() {
        let (_tmp, service) = fixture();
        let entries = service.search(&ProjectQuery::default(), &fresh_token()).unwrap();

        let tool = entries.iter().find(|e| e.project.product_code == "GO").unwrap();
        assert_eq!(tool.launcher, None);
        let amp = entries.iter().find(|e| e.project.path_key == "E:/work/amp").unwrap();
        assert!(amp.launcher.as_deref().is_some_and(|l| l.ends_with("idea/bin/launcher")));
    }

    #[test]
    fn test_search_applies_product_and_text_filters() {
        let (_tmp, service) = fixture();
        let token = fresh_token();

        let by_code = ProjectQuery::new("", ProductFilter::ByProductCode("ps".into()));
        let entries = service.search(&by_code, &token).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].project.path_key, "E:/web/shop");

        let by_text = ProjectQuery::new("AMP", ProductFilter::AllProducts);
        assert_eq!(service.search(&by_text, &token).unwrap().len(), 1);

        let by_build = ProjectQuery::new(
            "",
            ProductFilter::ByProductBuild {
                code: "IU".into(),
                build_number: "251.1".into(),
            },
        );
        assert!(service.search(&by_build, &token).unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_query_yields_no_results() {
        let (_tmp, service) = fixture();
        let token = fresh_token();
        token.store(true, Ordering::SeqCst);

        assert_eq!(
            service.search(&ProjectQuery::default(), &token),
            Err(SearchError::Cancelled)
        );
        assert_eq!(
            service.launchable_projects(&ProductFilter::AllProducts, &token),
            Err(SearchError::Cancelled)
        );
    }

    #[test]
    fn test_launchable_projects_only_include_installed_builds() {
        let (_tmp, service) = fixture();
        let merged = service
            .launchable_projects(&ProductFilter::AllProducts, &fresh_token())
            .unwrap();

        let keys: Vec<&str> = merged.iter().map(|m| m.path()).collect();
        assert_eq!(keys, vec!["E:/work/api", "E:/work/amp", "E:/web/shop"]);
        assert!(merged.iter().all(|m| m.executable_path().is_some()));
    }

    #[test]
    fn test_launchable_projects_are_cached_per_filter() {
        let (tmp, service) = fixture();
        let filter = ProductFilter::ByProductCode("IU".into());
        let first = service.launchable_projects(&filter, &fresh_token()).unwrap();

        fs::remove_dir_all(tmp.path().join("data")).unwrap();
        // A cancelled token is not consulted on a cache hit.
        let cancelled = fresh_token();
        cancelled.store(true, Ordering::SeqCst);
        assert_eq!(service.launchable_projects(&filter, &cancelled).unwrap(), first);

        service.invalidate();
        assert!(
            service
                .launchable_projects(&filter, &fresh_token())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_cancelled_merge_is_not_cached() {
        let (_tmp, service) = fixture();
        let filter = ProductFilter::AllProducts;
        let cancelled = fresh_token();
        cancelled.store(true, Ordering::SeqCst);

        assert_eq!(
            service.launchable_projects(&filter, &cancelled),
            Err(SearchError::Cancelled)
        );
        assert_eq!(
            service.launchable_projects(&filter, &fresh_token()).unwrap().len(),
            3
        );
    }

    #[test]
    fn test_last_opened_per_history_file() {
        let (_tmp, service) = fixture();
        let last = service.last_opened();
        assert_eq!(last.len(), 3);

        let idea = last
            .iter()
            .find(|l| l.history_file.to_string_lossy().contains("IntelliJIdea"))
            .unwrap();
        assert_eq!(idea.last_opened_project.as_deref(), Some("E:/work/amp"));
        assert_eq!(idea.last_project_location, None);

        let go = last
            .iter()
            .find(|l| l.history_file.to_string_lossy().contains("GoLand"))
            .unwrap();
        assert_eq!(go.last_opened_project, None);
    }

    #[test]
    fn test_coordinator_cancels_previous_query() {
        let coordinator = QueryCoordinator::new();
        let first = coordinator.begin();
        assert!(!first.load(Ordering::SeqCst));

        let second = coordinator.begin();
        assert!(first.load(Ordering::SeqCst));
        assert!(!second.load(Ordering::SeqCst));
    }
}
