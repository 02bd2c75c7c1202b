use artifact_resolver::{Config, DependencyManifest, MavenDirectoryRepository, Repository, RepositorySet, ResolutionContext};

fn main() {
	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",        "Show help");
		opts.optflag( "v", "verbose",     "Increased verbosity");
		opts.optflag( "l", "use-latest",  "Prefer the newest version when requirements conflict");
		opts.optmulti("r", "repository",  "Maven repository directory to search", "DIR");
		opts.optopt(  "c", "config",      "Config file", "FILE");
		opts.optflag( "",  "json",        "Print results as JSON");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { println!("Unable to parse options: {}", e); return }
		};

		if parsed_options.opt_present("h") || parsed_options.free.is_empty() {
			eprintln!("{}", opts.usage("Usage: artifact-resolver-terminal [options] (resolve <manifest.json> | versions <group:artifact>)"));
			return;
		}

		parsed_options
	};

	let default_level = if parsed_options.opt_present("v") { "debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

	let mut config = match parsed_options.opt_str("c") {
		Some(path) => match Config::load_from_file(&path) {
			Ok(c) => c,
			Err(e) => { log::error!("Failed to read config file {}: {}", path, e); return },
		},
		None => Config::from_env(),
	};
	for path in parsed_options.opt_strs("r") {
		config.add_repository(path);
	}
	if parsed_options.opt_present("l") {
		config.set_use_latest(true);
	}
	let json = parsed_options.opt_present("json");

	let result = match parsed_options.free[0].as_str() {
		"resolve" => match parsed_options.free.get(1) {
			Some(path) => resolve(&config, path, json),
			None => Err(Error::MissingArgument("manifest path")),
		},
		"versions" => match parsed_options.free.get(1) {
			Some(key) => versions(&config, key, json),
			None => Err(Error::MissingArgument("group:artifact")),
		},
		other => Err(Error::UnknownCommand(other.to_string())),
	};

	if let Err(e) = result {
		log::error!("{}", e);
		std::process::exit(1);
	}
}

fn resolve(config: &Config, manifest_path: &str, json: bool) -> Result<(), Error> {
	let manifest = DependencyManifest::load_from_file(manifest_path)?;
	let context = ResolutionContext::new();
	manifest.register(&context)?;

	/* Repositories named by the manifest are searched after the configured ones */
	let mut repository = config.repository_set();
	for path in context.repositories() {
		repository.add(MavenDirectoryRepository::new(path));
	}
	if repository.is_empty() {
		log::warn!("No repositories configured, use -r or set ANDROID_HOME");
	}

	let resolution = context.resolve_dependencies(&repository, config.use_latest())
		.map_err(artifact_resolver::Error::from)?;

	if json {
		println!("{}", serde_json::to_string_pretty(&resolution)?);
		return Ok(());
	}

	for (_, resolved) in resolution.iter() {
		println!("{}", resolved.coordinate());
		for requester in &resolved.requested_by {
			println!("\trequired by {}", requester);
		}
		if let Some(path) = &resolved.artifact_path {
			println!("\t{}", path.display());
		}
	}
	Ok(())
}

fn versions(config: &Config, key: &str, json: bool) -> Result<(), Error> {
	let spec: artifact_resolver::ArtifactSpec = key.parse()?;
	let repository: RepositorySet = config.repository_set();

	let mut versions: Vec<artifact_resolver::Version> = repository.list_available_versions(&spec.group, &spec.artifact)
		.map_err(artifact_resolver::Error::from)?
		.iter()
		.map(|v| artifact_resolver::Version::parse(v))
		.collect();
	versions.sort_by(|a, b| b.cmp(a));
	versions.dedup();

	if json {
		println!("{}", serde_json::to_string_pretty(&versions)?);
	} else {
		for version in versions {
			println!("{}", version);
		}
	}
	Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Resolver(#[from] artifact_resolver::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("Missing argument: {0}")]
	MissingArgument(&'static str),
	#[error("Unknown command: {0}")]
	UnknownCommand(String),
}
