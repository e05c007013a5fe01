//! Crawler coordinator - two-phase crawl orchestration
//!
//! This module drives one category's crawl from start to persisted
//! artifacts:
//!
//! - the list phase discovers how many index pages exist *while* crawling
//!   them: page 1 is fetched blind, every parsed page can raise the known
//!   maximum, and newly known pages are dispatched exactly once
//! - the detail phase drains the collected links through a
//!   semaphore-bounded fetch pool, extracting a record and downloading the
//!   item image for each
//!
//! All mutable crawl state lives on this control task; fetches run in
//! spawned tasks and report back over a channel, so stores and counters are
//! mutated from exactly one place. Phase completion is inferred from
//! converging state (see the phase-state types), not from a total known in
//! advance.

use crate::catalog::{Category, LinkStore, RecordStore};
use crate::config::Config;
use crate::crawler::fetcher::{
    build_http_client, download_image, fetch_page, list_page_url, FetchOutcome,
};
use crate::crawler::parser::{parse_detail_page, parse_list_page, ParsedDetailPage};
use crate::output::{ArtifactPaths, CrawlReport};
use crate::state::{DetailPhaseState, ListPhaseState};
use crate::{ParseError, Result};
use chrono::Utc;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use url::Url;

/// Orchestrates the two crawl phases for single category runs
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
}

/// Completion report of one list-page fetch task
struct ListFetchDone {
    page: u32,
    outcome: FetchOutcome,
}

/// Completion report of one detail fetch task
enum DetailEvent {
    /// Page fetched and parsed; the image transfer has already resolved
    Fetched {
        parsed: Box<ParsedDetailPage>,
        image_ok: bool,
    },

    /// Transport or HTTP failure; no record collected
    FetchFailed,

    /// Page structure broken; aborts the run
    Fatal(ParseError),
}

impl Coordinator {
    /// Creates a new coordinator instance
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(&config.http)?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Runs both crawl phases for one category and persists the artifacts
    ///
    /// `list.json` is written exactly once, at the list→detail hand-off;
    /// `data.json` once, when the detail phase completes.
    pub async fn run(&self, category: Category) -> Result<CrawlReport> {
        let index_url = self.config.categories.for_category(category).to_string();
        let paths = ArtifactPaths::new(&self.config.output.database_dir, category);

        tracing::info!("Start to crawl list pages of category: {}", category);
        let (links, list_state) = self.run_list_phase(category, &index_url).await?;

        crate::output::write_links(&paths.list_json, &links)?;
        tracing::info!("All list pages done, status:");
        tracing::info!("Pages crawled: {}", list_state.max_page().unwrap_or(0));
        tracing::info!("Total items on page: {}", list_state.items_seen);
        tracing::info!("Duplicated items: {}", links.duplicates());
        tracing::info!("Links collected: {}", links.len());

        tracing::info!("Start to crawl detail pages of category: {}", category);
        let (records, detail_state) = self
            .run_detail_phase(category, &links, &paths.pics_dir)
            .await?;

        crate::output::write_records(&paths.data_json, &records)?;
        tracing::info!("All detail pages done, status:");
        tracing::info!("Pages crawled: {}", detail_state.total);

        Ok(CrawlReport {
            category,
            pages_crawled: list_state.max_page().unwrap_or(0),
            items_seen: list_state.items_seen,
            duplicate_items: links.duplicates(),
            links_collected: links.len(),
            list_fetch_failures: list_state.fetch_failures,
            detail_total: detail_state.total,
            detail_finished: detail_state.finished,
            detail_fetch_failures: detail_state.fetch_failures,
            image_failures: detail_state.image_failures,
            soft_issues: detail_state.soft_issues,
            records_collected: records.len(),
            finished_at: Utc::now(),
        })
    }

    /// List phase: enumerate all index pages into a LinkStore
    ///
    /// The page count is discovered dynamically: page 1 is dispatched
    /// immediately, and each parsed page's pagination footer can raise the
    /// known maximum, scheduling the newly known pages. The phase is over
    /// when nothing is in flight and the maximum is known, which cannot be
    /// the case before at least one page has fully round-tripped.
    async fn run_list_phase(
        &self,
        category: Category,
        index_url: &str,
    ) -> Result<(LinkStore, ListPhaseState)> {
        let base_url = Url::parse(index_url)?;
        let mut state = ListPhaseState::new();
        let mut links = LinkStore::new();

        let (tx, mut rx) = mpsc::unbounded_channel();

        self.spawn_list_fetch(index_url, 1, &tx);
        state.mark_scheduled(1);

        while let Some(done) = rx.recv().await {
            if !state.mark_finished(done.page) {
                tracing::warn!(
                    "Finished list page {} was not tracked as in flight",
                    done.page
                );
            }

            match done.outcome {
                FetchOutcome::Success { body } => {
                    let parsed = parse_list_page(&body, done.page, &base_url)?;
                    state.observe_max_page(parsed.max_page);
                    state.items_seen += parsed.items.len() as u64;

                    for (name, link) in parsed.items {
                        if links.insert(name.clone(), link) {
                            tracing::debug!(
                                "Duplicate item name on list page {}: {}",
                                done.page,
                                name
                            );
                        }
                    }

                    tracing::info!(
                        "Crawl work of list page {} done. Current max page number: {}",
                        done.page,
                        parsed.max_page
                    );
                }
                FetchOutcome::HttpError { status_code } => {
                    state.fetch_failures += 1;
                    tracing::error!(
                        "Wrong code {} while fetching list page {} of {}",
                        status_code,
                        done.page,
                        category
                    );
                }
                FetchOutcome::NetworkError { error } => {
                    state.fetch_failures += 1;
                    tracing::error!(
                        "Error fetching list page {} of {}: {}",
                        done.page,
                        category,
                        error
                    );
                }
            }

            // Dispatch every page that became known with this event.
            let newly_known: Vec<u32> = state.unscheduled_pages().collect();
            for page in newly_known {
                self.spawn_list_fetch(index_url, page, &tx);
                state.mark_scheduled(page);
            }

            if state.is_complete() {
                break;
            }

            if state.in_flight_count() == 0 {
                // Every dispatched fetch resolved yet no page was ever
                // parsed: page 1 itself failed. End with what we have
                // (nothing) instead of waiting for a page that will never
                // arrive.
                tracing::error!(
                    "List phase of {} ended without a parsed page; no links collected",
                    category
                );
                break;
            }
        }

        Ok((links, state))
    }

    fn spawn_list_fetch(
        &self,
        index_url: &str,
        page: u32,
        tx: &mpsc::UnboundedSender<ListFetchDone>,
    ) {
        let client = self.client.clone();
        let url = list_page_url(index_url, page);
        let tx = tx.clone();

        tracing::info!("Start to fetch list page of number: {}", page);
        tokio::spawn(async move {
            let outcome = fetch_page(&client, &url).await;
            let _ = tx.send(ListFetchDone { page, outcome });
        });
    }

    /// Detail phase: fetch every collected link into a RecordStore
    ///
    /// The total is fixed from the LinkStore snapshot before the first
    /// dispatch, and every fetch (success or failure) counts toward it
    /// exactly once, so the phase can neither finish early nor hang on a
    /// failed fetch. A record is not accounted for until its image transfer
    /// has resolved too.
    async fn run_detail_phase(
        &self,
        category: Category,
        links: &LinkStore,
        pics_dir: &Path,
    ) -> Result<(RecordStore, DetailPhaseState)> {
        let queue = links.snapshot();
        let mut state = DetailPhaseState::new(queue.len());
        let mut records = RecordStore::new();

        if queue.is_empty() {
            return Ok((records, state));
        }

        let concurrency = self.config.crawler.max_concurrent_detail_fetches as usize;
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for (name, link) in queue {
            let client = self.client.clone();
            let http = self.config.http.clone();
            let semaphore = semaphore.clone();
            let tx = tx.clone();
            let pics_dir = pics_dir.to_path_buf();

            tokio::spawn(async move {
                // Bounds the number of in-flight detail fetches.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    let _ = tx.send(DetailEvent::FetchFailed);
                    return;
                };

                tracing::info!("Start to fetch detail page of: {}", name);
                let event = match fetch_page(&client, link.as_str()).await {
                    FetchOutcome::Success { body } => {
                        match parse_detail_page(&body, &name, &link, category) {
                            Ok(parsed) => {
                                let dest = pics_dir.join(&parsed.record.pic);
                                let image_ok = match download_image(
                                    &client,
                                    &parsed.record.piclink,
                                    &dest,
                                    &http,
                                )
                                .await
                                {
                                    Ok(()) => true,
                                    Err(e) => {
                                        tracing::error!(
                                            "Image download failed for {}: {}",
                                            parsed.record.name,
                                            e
                                        );
                                        false
                                    }
                                };
                                DetailEvent::Fetched {
                                    parsed: Box::new(parsed),
                                    image_ok,
                                }
                            }
                            Err(e) => DetailEvent::Fatal(e),
                        }
                    }
                    FetchOutcome::HttpError { status_code } => {
                        tracing::error!(
                            "Wrong code {} while fetching detail page of: {}",
                            status_code,
                            name
                        );
                        DetailEvent::FetchFailed
                    }
                    FetchOutcome::NetworkError { error } => {
                        tracing::error!("Error fetching detail page of {}: {}", name, error);
                        DetailEvent::FetchFailed
                    }
                };
                let _ = tx.send(event);
            });
        }
        drop(tx);

        while let Some(event) = rx.recv().await {
            match event {
                DetailEvent::Fetched { parsed, image_ok } => {
                    state.mark_finished();
                    if parsed.col_missing {
                        state.soft_issues += 1;
                        tracing::warn!(
                            "No color variant in image filename of \"{}\", using \"all\"",
                            parsed.record.name
                        );
                    }
                    if !image_ok {
                        state.image_failures += 1;
                    }
                    tracing::info!(
                        "Crawl work of detail page \"{}\" done, progress: {} / {}",
                        parsed.record.name,
                        state.finished,
                        state.total
                    );
                    records.insert(parsed.key, parsed.record);
                }
                DetailEvent::FetchFailed => {
                    state.mark_finished();
                    state.fetch_failures += 1;
                }
                DetailEvent::Fatal(e) => return Err(e.into()),
            }

            if state.is_complete() {
                break;
            }
        }

        Ok((records, state))
    }
}

/// Runs the full two-phase crawl for one category
///
/// # Example
///
/// ```no_run
/// use costume_atlas::catalog::Category;
/// use costume_atlas::config::load_config;
/// use costume_atlas::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config, Category::Body).await?;
/// println!("{} records collected", report.records_collected);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, category: Category) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(category).await
}
