//! Navigation integration tests
//!
//! Drives a [`Router`] over a [`MemoryHistory`] and checks the entry stack,
//! the published location and the reload decision together.

use std::cell::RefCell;
use std::rc::Rc;

use compass_core::reactive::Readable;
use compass_router::{
	HistoryBackend, Location, MemoryHistory, NavigationOutcome, Router, RouterOptions,
	RouterOptionsPatch,
};
use rstest::{fixture, rstest};

struct Harness {
	router: Router,
	history: MemoryHistory,
}

#[fixture]
fn harness() -> Harness {
	let history = MemoryHistory::new();
	let router = Router::new(history.clone());
	Harness { router, history }
}

#[rstest]
fn test_back_restores_previous_location_exactly(harness: Harness) {
	let Harness { router, history } = harness;

	router.push("/a?x=1#top").unwrap();
	router.push("/b").unwrap();
	history.back();

	assert_eq!(router.location(), Location::parse("/a?x=1#top"));
	assert_eq!(router.path().get(), "/a");
	assert_eq!(router.query().get(), "x=1");
	assert_eq!(router.hash().get(), "top");
	assert_eq!(router.history_len(), 3);
	assert_eq!(router.history_index(), 1);
}

#[rstest]
fn test_router_back_and_forward(harness: Harness) {
	let Harness { router, .. } = harness;

	router.push("/a").unwrap();
	router.push("/b").unwrap();

	router.back().unwrap();
	router.back().unwrap();
	assert_eq!(router.location().path, "/");

	router.forward().unwrap();
	assert_eq!(router.location().path, "/a");

	router.go(1).unwrap();
	assert_eq!(router.location().path, "/b");

	// Past the end: ignored.
	router.forward().unwrap();
	assert_eq!(router.location().path, "/b");
}

#[rstest]
fn test_replace_twice_keeps_single_entry(harness: Harness) {
	let Harness { router, history } = harness;

	router.replace("/a").unwrap();
	assert_eq!(router.history_len(), 1);

	router.replace("/b").unwrap();

	assert_eq!(router.history_len(), 1);
	assert_eq!(history.len(), 1);
	assert_eq!(history.current_href(), "/b");
	assert_eq!(router.location().path, "/b");
}

#[rstest]
fn test_push_after_back_discards_forward(harness: Harness) {
	let Harness { router, history } = harness;

	router.push("/a").unwrap();
	router.push("/b").unwrap();
	router.back().unwrap();
	router.push("/c").unwrap();

	assert_eq!(history.entries(), vec!["/", "/a", "/c"]);
	let paths: Vec<String> = router
		.entries()
		.into_iter()
		.map(|entry| entry.location.path)
		.collect();
	assert_eq!(paths, vec!["/", "/a", "/c"]);
}

#[rstest]
#[case("/docs/intro", "/docs/intro", "", "")]
#[case("guide", "/docs/guide", "", "")]
#[case("?page=2", "/docs/intro", "page=2", "")]
#[case("#setup", "/docs/intro", "", "setup")]
#[case("http://localhost/api?v=1", "/api", "v=1", "")]
fn test_href_forms(
	harness: Harness,
	#[case] href: &str,
	#[case] path: &str,
	#[case] query: &str,
	#[case] hash: &str,
) {
	let Harness { router, .. } = harness;
	router.push("/docs/intro").unwrap();

	router.push(href).unwrap();

	assert_eq!(router.path().get(), path);
	assert_eq!(router.query().get(), query);
	assert_eq!(router.hash().get(), hash);
}

#[rstest]
fn test_cross_origin_reloads_by_default(harness: Harness) {
	let Harness { router, history } = harness;

	let outcome = router.push("https://example.com/page").unwrap();

	assert_eq!(
		outcome,
		NavigationOutcome::Reloaded("https://example.com/page".to_string())
	);
	assert_eq!(history.reloads(), vec!["https://example.com/page"]);
	assert_eq!(router.history_len(), 1);
}

#[rstest]
fn test_reload_prevent_suppresses_reload(harness: Harness) {
	let Harness { router, history } = harness;
	router.push("/here").unwrap();

	router.set_options(RouterOptionsPatch::new().reload_prevent(true));
	let outcome = router.push("https://example.com/page").unwrap();

	assert_eq!(
		outcome,
		NavigationOutcome::Prevented("https://example.com/page".to_string())
	);
	assert!(history.reloads().is_empty());
	assert_eq!(router.location().path, "/here");
	assert_eq!(router.history_len(), 2);
}

#[rstest]
fn test_reload_prevent_applies_to_replace() {
	let history = MemoryHistory::new();
	let router = Router::with_options(
		history.clone(),
		RouterOptions::new().with_reload_prevent(true),
	);

	let outcome = router.replace("//cdn.example.com/x").unwrap();

	assert!(matches!(outcome, NavigationOutcome::Prevented(_)));
	assert!(history.reloads().is_empty());
}

#[rstest]
fn test_path_outside_base_leaves_application() {
	let history = MemoryHistory::with_entry("/app");
	let router = Router::with_options(history.clone(), RouterOptions::new().with_base("/app"));

	assert!(router.push("/app/settings").unwrap().is_navigated());

	let outcome = router.push("/login").unwrap();

	assert_eq!(
		outcome,
		NavigationOutcome::Reloaded("http://localhost/login".to_string())
	);
	assert_eq!(router.location().path, "/app/settings");
}

#[rstest]
fn test_reload_prevent_keeps_path_outside_base_in_app() {
	let history = MemoryHistory::with_entry("/app");
	let router = Router::with_options(
		history.clone(),
		RouterOptions::new().with_base("/app").with_reload_prevent(true),
	);

	let outcome = router.push("/login?next=app").unwrap();

	assert_eq!(outcome, NavigationOutcome::Navigated);
	assert!(history.reloads().is_empty());
	assert_eq!(history.current_href(), "/login?next=app");
	assert_eq!(router.path().get(), "/login");
	assert_eq!(router.query().get(), "next=app");
	assert_eq!(router.history_len(), 2);

	router.replace("/signup").unwrap();
	assert_eq!(router.location().path, "/signup");
	assert_eq!(router.history_len(), 2);
}

#[rstest]
fn test_popped_entry_outside_base_ignored() {
	let history = MemoryHistory::with_entry("/app");
	let router = Router::with_options(history.clone(), RouterOptions::new().with_base("/app"));
	router.push("/app/a").unwrap();
	history.push_foreign("/login");

	history.back();
	history.forward();

	assert_eq!(router.location().path, "/app/a");
	assert_eq!(router.history_len(), 2);
	assert!(history.reloads().is_empty());
}

#[rstest]
fn test_popped_entry_outside_base_restored_with_reload_prevent() {
	let history = MemoryHistory::with_entry("/app");
	let router = Router::with_options(
		history.clone(),
		RouterOptions::new().with_base("/app").with_reload_prevent(true),
	);
	router.push("/app/a").unwrap();
	history.push_foreign("/login");

	history.back();
	history.forward();

	assert_eq!(router.location().path, "/login");
}

#[rstest]
#[case("http://[::1", "/http%3A//%5B%3A%3A1")]
#[case("//", "/")]
#[case("%", "/docs/%25")]
#[case("\u{0}", "/docs/intro")]
fn test_malformed_href_navigates_best_effort(
	harness: Harness,
	#[case] href: &str,
	#[case] path: &str,
) {
	let Harness { router, history } = harness;
	router.push("/docs/intro").unwrap();

	let outcome = router.push(href).unwrap();

	assert_eq!(outcome, NavigationOutcome::Navigated);
	assert_eq!(router.path().get(), path);
	assert!(history.reloads().is_empty());
}

#[rstest]
fn test_unknown_popped_entry_replaces_current(harness: Harness) {
	let Harness { router, history } = harness;
	router.push("/a").unwrap();
	history.push_foreign("/foreign?from=elsewhere");

	history.back();
	assert_eq!(router.location().path, "/a");

	history.forward();

	assert_eq!(router.location(), Location::parse("/foreign?from=elsewhere"));
	assert_eq!(router.history_len(), 2);
	assert_eq!(router.history_index(), 1);
}

#[rstest]
fn test_reentrant_push_is_queued(harness: Harness) {
	let Harness { router, .. } = harness;
	let outcomes = Rc::new(RefCell::new(Vec::new()));
	let seen = Rc::new(RefCell::new(Vec::new()));

	let inner = router.clone();
	let outcome_sink = outcomes.clone();
	let seen_sink = seen.clone();
	let _sub = router.path().subscribe(move |path: &String| {
		seen_sink.borrow_mut().push(path.clone());
		if path == "/login" {
			outcome_sink.borrow_mut().push(inner.replace("/login/form").unwrap());
		}
	});

	let outer = router.push("/login").unwrap();

	assert_eq!(outer, NavigationOutcome::Navigated);
	assert_eq!(*outcomes.borrow(), vec![NavigationOutcome::Queued]);
	assert_eq!(*seen.borrow(), vec!["/", "/login", "/login/form"]);
	assert_eq!(router.location().path, "/login/form");
	assert_eq!(router.history_len(), 2);
}

#[rstest]
fn test_options_take_effect_on_next_navigation(harness: Harness) {
	let Harness { router, history } = harness;

	router.set_options(RouterOptionsPatch::new().reload_prevent(true));
	router.push("https://example.com").unwrap();
	router.set_options(RouterOptionsPatch::new().reload_prevent(false));
	router.push("https://example.com").unwrap();

	assert_eq!(history.reloads(), vec!["https://example.com/"]);
}

#[rstest]
fn test_options_loaded_from_file() {
	use std::io::Write;

	let mut file = tempfile::NamedTempFile::new().unwrap();
	writeln!(file, "reloadPrevent = true").unwrap();
	let options = RouterOptions::from_toml_file(file.path()).unwrap();

	let history = MemoryHistory::new();
	let router = Router::with_options(history.clone(), options);

	assert!(matches!(
		router.push("https://example.com").unwrap(),
		NavigationOutcome::Prevented(_)
	));
	assert!(history.reloads().is_empty());
}
