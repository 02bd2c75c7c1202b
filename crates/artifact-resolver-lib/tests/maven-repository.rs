use artifact_resolver::{Config, ResolutionContext, Repository, RepositorySet};
use artifact_resolver_test_utils::MavenTree;

const GMS: &str = "com.google.android.gms";

fn play_services_tree() -> MavenTree {
	let tree = MavenTree::new().unwrap();
	tree.metadata(GMS, "play-services-games", &["9.6.0", "9.8.0"]).unwrap();
	tree.pom(GMS, "play-services-games", "9.6.0", "aar", &["com.google.android.gms:play-services-base:[9.6.0]"]).unwrap();
	tree.pom(GMS, "play-services-games", "9.8.0", "aar", &["com.google.android.gms:play-services-base:[9.8.0]"]).unwrap();
	tree.artifact_file(GMS, "play-services-games", "9.8.0", "aar").unwrap();

	/* No metadata file, versions come from the directories */
	tree.pom(GMS, "play-services-base", "9.6.0", "aar", &[]).unwrap();
	tree.pom(GMS, "play-services-base", "9.8.0", "aar", &[]).unwrap();
	tree
}

#[test]
fn maven_tree_resolves_transitive_dependencies() {
	let tree = play_services_tree();
	let repo = tree.repository();
	let ctx = ResolutionContext::new();
	ctx.register_client("games").depend_on(GMS, "play-services-games", "9.6+");

	let resolution = ctx.resolve_dependencies(&repo, false).unwrap();
	let games = resolution.get("com.google.android.gms:play-services-games").unwrap();
	assert_eq!(games.version.as_str(), "9.8.0");
	assert_eq!(games.artifact_path.as_deref(), Some(tree.artifact_dir(GMS, "play-services-games").join("9.8.0/play-services-games-9.8.0.aar").as_path()));

	let base = resolution.get("com.google.android.gms:play-services-base").unwrap();
	assert_eq!(base.version.as_str(), "9.8.0");
	assert_eq!(resolution.requirements_of("com.google.android.gms:play-services-games"), vec!["com.google.android.gms:play-services-base"]);
}

#[test]
fn maven_tree_pinned_base_selects_older_artifact() {
	let tree = play_services_tree();
	let repo = tree.repository();
	let ctx = ResolutionContext::new();
	let client = ctx.register_client("games");
	client.depend_on(GMS, "play-services-games", "9.6+");
	client.depend_on(GMS, "play-services-base", "9.6.0");

	let resolution = ctx.resolve_dependencies(&repo, false).unwrap();
	assert_eq!(resolution.version_of("com.google.android.gms:play-services-games").unwrap().as_str(), "9.6.0");
	assert_eq!(resolution.version_of("com.google.android.gms:play-services-base").unwrap().as_str(), "9.6.0");
}

#[test]
fn repository_set_merges_versions() {
	let first = play_services_tree();
	let second = MavenTree::new().unwrap();
	second.pom(GMS, "play-services-base", "10.0.0", "aar", &[]).unwrap();

	let set = RepositorySet::new()
		.with(first.repository())
		.with(second.repository());
	let mut versions = set.list_available_versions(GMS, "play-services-base").unwrap();
	versions.sort();
	assert_eq!(versions, vec!["10.0.0", "9.6.0", "9.8.0"]);
	assert!(set.declared_dependencies(GMS, "play-services-base", "10.0.0").unwrap().is_empty());
	assert!(set.list_available_versions(GMS, "missing").is_err());
}

#[test]
fn config_finds_sdk_repositories() {
	let sdk = MavenTree::new().unwrap();
	let google = sdk.path().join("extras/google/m2repository");
	std::fs::create_dir_all(&google).unwrap();

	let mut config = Config::default();
	config.set_android_sdk(Some(sdk.path().to_path_buf()));
	assert_eq!(config.search_paths(), vec![google]);
	assert!(config.repository_set().list_available_versions(GMS, "play-services-games").is_err());
}
