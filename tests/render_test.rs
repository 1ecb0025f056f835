use claude_usage_statusline::cache::{
    CACHE_TTL_SECONDS, KvStore, MemoryStore, USAGE_CACHE_KEY, UsageCache,
};
use claude_usage_statusline::credentials::TokenSource;
use claude_usage_statusline::display::strip_ansi;
use claude_usage_statusline::git::GitRunner;
use claude_usage_statusline::models::{SessionInput, UsageQuota};
use claude_usage_statusline::statusline::{StatusLine, UsageUnavailable};
use claude_usage_statusline::usage_api::{UsageFetcher, parse_usage_body};
use claude_usage_statusline::utils::now_epoch_secs;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

#[derive(Default)]
struct FakeGit {
    responses: HashMap<String, String>,
}

impl FakeGit {
    fn with(mut self, args: &str, out: &str) -> Self {
        self.responses.insert(args.to_string(), out.to_string());
        self
    }

    /// `main`, no upstream, nothing to commit.
    fn clean_main() -> Self {
        Self::default()
            .with("rev-parse --abbrev-ref HEAD", "main\n")
            .with("status --porcelain", "")
    }
}

impl GitRunner for FakeGit {
    fn run(&self, args: &[&str], _cwd: &Path) -> Option<String> {
        self.responses.get(&args.join(" ")).cloned()
    }
}

struct StaticToken(Option<&'static str>);

impl TokenSource for StaticToken {
    fn name(&self) -> &'static str {
        "static"
    }
    fn token(&self) -> Option<String> {
        self.0.map(str::to_string)
    }
}

/// Replays a canned response body and records the tokens it was called with.
#[derive(Clone)]
struct CannedFetcher {
    body: &'static str,
    tokens: Rc<RefCell<Vec<String>>>,
}

impl CannedFetcher {
    fn new(body: &'static str) -> Self {
        Self {
            body,
            tokens: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl UsageFetcher for CannedFetcher {
    fn fetch(&self, token: &str) -> Option<UsageQuota> {
        self.tokens.borrow_mut().push(token.to_string());
        parse_usage_body(self.body)
    }
}

struct CountingSource {
    hits: Rc<Cell<u32>>,
}

impl TokenSource for CountingSource {
    fn name(&self) -> &'static str {
        "counting"
    }
    fn token(&self) -> Option<String> {
        self.hits.set(self.hits.get() + 1);
        None
    }
}

fn statusline(
    git: FakeGit,
    store: &MemoryStore,
    token: Option<&'static str>,
    fetcher: &CannedFetcher,
) -> StatusLine {
    StatusLine {
        git: Box::new(git),
        cache: UsageCache::new(Box::new(store.clone()), CACHE_TTL_SECONDS),
        token_sources: vec![Box::new(StaticToken(token))],
        fetcher: Box::new(fetcher.clone()),
        home_dir: Some("/home/u".to_string()),
    }
}

fn seed_cache(store: &MemoryStore, timestamp: f64, five_hour: f64, seven_day: f64) {
    store
        .put(
            USAGE_CACHE_KEY,
            &json!({
                "timestamp": timestamp,
                "data": {
                    "five_hour": {"utilization": five_hour, "resets_at": "2026-01-24T06:00:00Z"},
                    "seven_day": {"utilization": seven_day, "resets_at": null}
                }
            }),
        )
        .unwrap();
}

fn plain(lines: &[String]) -> Vec<String> {
    lines.iter().map(|l| strip_ansi(l)).collect()
}

#[test]
fn test_cached_usage_renders_full_summary() {
    let store = MemoryStore::default();
    seed_cache(&store, now_epoch_secs(), 70.0, 6.0);
    let fetcher = CannedFetcher::new("{}");
    let sl = statusline(FakeGit::clean_main(), &store, None, &fetcher);

    let input =
        SessionInput::from_slice(br#"{"cwd":"/home/u/proj","model":{"display_name":"Opus"}}"#);
    let lines = plain(&sl.render(&input));

    assert_eq!(lines.len(), 2);
    let line1 = &lines[0];
    assert!(line1.contains("Opus"), "{line1}");
    assert!(line1.contains("main ✓"), "{line1}");
    assert!(line1.contains("Context 0%"), "{line1}");
    assert!(line1.contains("Session 70%"), "{line1}");
    assert!(line1.contains("Week 6%"), "{line1}");
    assert_eq!(
        line1,
        "Opus · main ✓ · Context 0% (0/200k) · Session 70% @2pm · Week 6%"
    );
    assert_eq!(lines[1], "~/proj");
    // Served from cache: no network call.
    assert!(fetcher.tokens.borrow().is_empty());
}

#[test]
fn test_no_cache_and_no_token() {
    let store = MemoryStore::default();
    let fetcher = CannedFetcher::new("{}");
    let sl = statusline(FakeGit::clean_main(), &store, None, &fetcher);

    let input =
        SessionInput::from_slice(br#"{"cwd":"/home/u/proj","model":{"display_name":"Opus"}}"#);
    let lines = sl.render(&input);

    assert_eq!(plain(&lines), vec!["No token".to_string()]);
    #[cfg(feature = "colors")]
    assert_eq!(lines[0], "\x1b[2mNo token\x1b[0m");
    assert!(fetcher.tokens.borrow().is_empty());
    assert!(store.get(USAGE_CACHE_KEY).is_none());
}

#[test]
fn test_expired_cache_and_unparsable_response() {
    let store = MemoryStore::default();
    seed_cache(&store, now_epoch_secs() - CACHE_TTL_SECONDS - 1.0, 70.0, 6.0);
    let fetcher = CannedFetcher::new("<html>upstream connect error</html>");
    let sl = statusline(FakeGit::clean_main(), &store, Some("tok-abc"), &fetcher);

    let lines = sl.render(&SessionInput::default());

    assert_eq!(plain(&lines), vec!["API error".to_string()]);
    assert_eq!(*fetcher.tokens.borrow(), vec!["tok-abc".to_string()]);
}

#[test]
fn test_successful_fetch_is_cached() {
    let store = MemoryStore::default();
    let fetcher = CannedFetcher::new(
        r#"{"five_hour":{"utilization":85.2,"resets_at":"2026-01-24T06:05:00Z"},"seven_day":{"utilization":55,"resets_at":"2026-01-24T01:00:00Z"}}"#,
    );
    let sl = statusline(FakeGit::default(), &store, Some("tok"), &fetcher);

    let input = SessionInput::from_slice(
        br#"{"model":{"id":"claude-sonnet-4"},"context_window":{"context_window_size":200000,"current_usage":{"input_tokens":1000,"cache_read_input_tokens":140000,"cache_creation_input_tokens":5000}}}"#,
    );
    let lines = plain(&sl.render(&input));
    assert_eq!(
        lines,
        vec![
            "claude-sonnet-4 · Context 73% (146k/200k) · Session 85% @2:05pm · Week 55% @Jan 24, 9am"
                .to_string()
        ]
    );

    let cached = store.get(USAGE_CACHE_KEY).unwrap();
    assert_eq!(cached["data"]["five_hour"]["utilization"], 85.2);

    // A second render is served from the cache.
    sl.render(&input);
    assert_eq!(fetcher.tokens.borrow().len(), 1);
}

#[test]
fn test_cache_hit_skips_token_lookup() {
    let store = MemoryStore::default();
    seed_cache(&store, now_epoch_secs(), 10.0, 20.0);
    let hits = Rc::new(Cell::new(0));
    let sl = StatusLine {
        git: Box::new(FakeGit::default()),
        cache: UsageCache::new(Box::new(store.clone()), CACHE_TTL_SECONDS),
        token_sources: vec![Box::new(CountingSource { hits: hits.clone() })],
        fetcher: Box::new(CannedFetcher::new("{}")),
        home_dir: None,
    };
    assert!(sl.usage_quota().is_ok());
    assert_eq!(hits.get(), 0);
}

#[test]
fn test_usage_quota_reasons() {
    let store = MemoryStore::default();
    let fetcher = CannedFetcher::new("not json");
    let no_token = statusline(FakeGit::default(), &store, None, &fetcher);
    assert_eq!(no_token.usage_quota(), Err(UsageUnavailable::NoToken));

    let bad_body = statusline(FakeGit::default(), &store, Some("t"), &fetcher);
    assert_eq!(bad_body.usage_quota(), Err(UsageUnavailable::ApiError));
}

#[test]
fn test_dirty_repo_and_workspace_fallback() {
    let store = MemoryStore::default();
    seed_cache(&store, now_epoch_secs(), 0.0, 0.0);
    let git = FakeGit::default()
        .with("rev-parse --abbrev-ref HEAD", "feat\n")
        .with("rev-parse --abbrev-ref @{upstream}", "origin/feat\n")
        .with("rev-list --left-right --count HEAD...origin/feat", "1\t0\n")
        .with("status --porcelain", "AM a.rs\n?? b.rs\n");
    let fetcher = CannedFetcher::new("{}");
    let sl = statusline(git, &store, None, &fetcher);

    let input = SessionInput::from_slice(
        br#"{"workspace":{"current_dir":"C:\\Users\\u\\code"},"context_window":{"total_input_tokens":160000}}"#,
    );
    let lines = plain(&sl.render(&input));
    assert_eq!(
        lines[0],
        "feat ↑1 +1 ~1 ?1 · Context 80% (160k/200k) · Session 0% @2pm · Week 0%"
    );
    assert_eq!(lines[1], "C:/Users/u/code");
}

#[test]
fn test_malformed_stdin_still_renders() {
    let store = MemoryStore::default();
    seed_cache(&store, now_epoch_secs(), 50.0, 80.0);
    let fetcher = CannedFetcher::new("{}");
    let sl = statusline(FakeGit::clean_main(), &store, None, &fetcher);

    let lines = plain(&sl.render(&SessionInput::from_slice(b"{\"cwd\": ")));
    assert_eq!(
        lines,
        vec!["Context 0% (0/200k) · Session 50% @2pm · Week 80%".to_string()]
    );
}
