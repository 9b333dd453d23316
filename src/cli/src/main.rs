//! pimctl - resolve role, scope and group inputs for PIM activation
//!
//! Thin operator front end for the resolution engine:
//! - Candidate listings from JSON/YAML files
//! - YAML configuration with named aliases
//! - Interactive selection when attached to a terminal

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pimctl_resolver::scope::expand_scope;
use pimctl_resolver::{
    report, CandidateKind, InteractiveMode, PromptSink, ResolutionOutcome, ResolveRequest,
    Resolver, ResolverConfig, SourceKey,
};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

mod config;
mod output;
mod prompt;
mod source;

use config::{alias_prefix, normalize_duration, Alias, PimConfig, ALIAS_PREFIXES};
use prompt::DialoguerPrompt;

const EXIT_NOT_FOUND: u8 = 2;
const EXIT_AMBIGUOUS: u8 = 3;
const EXIT_CANCELLED: u8 = 130;

/// pimctl CLI
#[derive(Parser, Debug)]
#[command(name = "pimctl")]
#[command(about = "Resolve role, scope and group names for privileged access activation")]
#[command(version)]
struct Cli {
    /// Path to configuration file (default: ~/.pimctl/config.yml)
    #[arg(short, long, global = true, env = "PIMCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Never prompt; report ambiguity instead
    #[arg(long, global = true, env = "PIMCTL_NON_INTERACTIVE")]
    non_interactive: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: ResolverOverrides,

    #[command(subcommand)]
    command: Command,
}

/// Resolver settings that override the configuration file
#[derive(Args, Debug, Default)]
struct ResolverOverrides {
    /// Enable or disable the fuzzy tier
    #[arg(long, global = true, env = "PIMCTL_FUZZY")]
    fuzzy: Option<bool>,

    /// Minimum fuzzy similarity (0.0-1.0)
    #[arg(long, global = true, env = "PIMCTL_FUZZY_THRESHOLD")]
    fuzzy_threshold: Option<f64>,

    /// Candidate cache lifetime
    #[arg(long, global = true, env = "PIMCTL_CACHE_TTL", value_name = "SECONDS")]
    cache_ttl: Option<u64>,
}

impl ResolverOverrides {
    fn apply(&self, config: &mut ResolverConfig) {
        if let Some(fuzzy) = self.fuzzy {
            config.fuzzy_enabled = fuzzy;
        }
        if let Some(threshold) = self.fuzzy_threshold {
            config.fuzzy_threshold = threshold;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache_ttl_seconds = ttl;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve an input to exactly one candidate
    Resolve(ResolveArgs),

    /// Show a numbered candidate listing for #N selection
    List {
        /// role, scope or group
        kind: CandidateKind,

        /// JSON or YAML candidate file
        #[arg(long)]
        candidates: PathBuf,
    },

    /// Manage aliases
    Alias {
        #[command(subcommand)]
        action: AliasCommand,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// role, scope or group
    kind: CandidateKind,

    /// Name, prefix, typo, full identifier, #N position or role alias
    input: String,

    /// JSON or YAML candidate file; scopes can be expanded without one
    #[arg(long)]
    candidates: Option<PathBuf>,

    /// Scope the candidates were listed under
    #[arg(long)]
    scope: Option<String>,

    /// Current subscription id, used to expand resource group names
    #[arg(long)]
    subscription: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum AliasCommand {
    /// List aliases
    List {
        /// Only aliases for one command family (res, entra, groups)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Show one alias
    Show { name: String },

    /// Add or update an alias
    Add {
        /// Alias name, e.g. res:prod
        name: String,

        #[command(flatten)]
        fields: AliasFields,
    },

    /// Remove an alias
    Remove { name: String },
}

#[derive(Args, Debug, Default)]
struct AliasFields {
    #[arg(long)]
    role: Option<String>,
    #[arg(long)]
    scope: Option<String>,
    /// Hours (4) or ISO 8601 duration (PT4H)
    #[arg(long, value_parser = parse_duration_arg)]
    duration: Option<String>,
    #[arg(long)]
    justification: Option<String>,
    #[arg(long)]
    subscription: Option<String>,
    #[arg(long)]
    resource_group: Option<String>,
    #[arg(long)]
    resource: Option<String>,
    #[arg(long)]
    resource_type: Option<String>,
    #[arg(long)]
    membership: Option<String>,
    #[arg(long)]
    condition: Option<String>,
}

impl From<AliasFields> for Alias {
    fn from(fields: AliasFields) -> Self {
        Self {
            role: fields.role,
            scope: fields.scope,
            duration: fields.duration,
            justification: fields.justification,
            subscription: fields.subscription,
            resource_group: fields.resource_group,
            resource: fields.resource,
            resource_type: fields.resource_type,
            membership: fields.membership,
            condition: fields.condition,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            output::error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},pimctl_resolver={}", level, level).into()),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Resolve(args) => resolve(args, &config, interactive_mode(cli.non_interactive)),
        Command::List { kind, candidates } => list(kind, &candidates),
        Command::Alias { action } => alias(action, &mut config),
        Command::Config {
            action: ConfigCommand::Show,
        } => {
            println!("# {}", config.path().display());
            print!("{}", serde_yaml::to_string(&config).context("Failed to render configuration")?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(cli: &Cli) -> Result<PimConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => PimConfig::default_path()?,
    };

    let mut config = PimConfig::load(&path)?;
    cli.overrides.apply(&mut config.resolver);
    config.validate()?;

    debug!("Loaded configuration from {:?}", path);
    Ok(config)
}

fn interactive_mode(non_interactive: bool) -> InteractiveMode {
    if non_interactive {
        return InteractiveMode::NonInteractive;
    }
    InteractiveMode::from_tty(io::stdin().is_terminal() && io::stderr().is_terminal())
}

/// What a `resolve` invocation looks up, after alias rewriting
#[derive(Debug, Clone, PartialEq)]
struct Target {
    input: String,
    scope: Option<String>,
    subscription: Option<String>,
    /// Alias the input was rewritten from
    alias: Option<String>,
}

/// Rewrites a role alias into its role name and scope
///
/// The alias scope wins over its resource group, which wins over `--scope`.
/// Only role inputs are looked up as aliases.
fn resolve_target(
    kind: CandidateKind,
    input: &str,
    scope: Option<String>,
    subscription: Option<String>,
    config: &PimConfig,
) -> Result<Target> {
    let input = input.trim();
    let alias = match kind {
        CandidateKind::Role => config.get_alias(input),
        _ => None,
    };

    let Some(alias) = alias else {
        return Ok(Target {
            input: input.to_string(),
            scope,
            subscription,
            alias: None,
        });
    };

    let role = alias
        .role
        .clone()
        .with_context(|| format!("Alias '{}' does not name a role", input))?;
    let subscription = alias.subscription.clone().or(subscription);
    let alias_scope = alias
        .scope
        .as_deref()
        .or(alias.resource_group.as_deref())
        .and_then(|s| expand_scope(s, subscription.as_deref()));

    Ok(Target {
        input: role,
        scope: alias_scope.or(scope),
        subscription,
        alias: Some(input.to_string()),
    })
}

/// Result of one `resolve` invocation
#[derive(Debug)]
enum Resolution {
    Outcome(ResolutionOutcome),
    /// Scope path built from the input alone
    Expanded(String),
    Cancelled,
}

impl Resolution {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Outcome(ResolutionOutcome::Resolved(_)) | Self::Expanded(_) => 0,
            Self::Outcome(ResolutionOutcome::Ambiguous(_)) => EXIT_AMBIGUOUS,
            Self::Outcome(ResolutionOutcome::NotFound(_)) => EXIT_NOT_FOUND,
            Self::Cancelled => EXIT_CANCELLED,
        }
    }
}

fn run_resolution(
    kind: CandidateKind,
    target: &Target,
    candidates: Option<&Path>,
    config: &ResolverConfig,
    mode: InteractiveMode,
    prompt: impl PromptSink + 'static,
) -> Result<Resolution> {
    let Some(path) = candidates else {
        return expand_unlisted(kind, &target.input, target.subscription.as_deref())
            .map(Resolution::Expanded);
    };

    let key = match &target.scope {
        Some(scope) => SourceKey::scoped(kind, scope.clone()),
        None => SourceKey::new(kind),
    };
    let resolver = Resolver::new(config.clone()).with_prompt(prompt);
    let request = ResolveRequest::new(&target.input, key).mode(mode);

    match resolver.resolve(&request, || source::load_candidates(path)) {
        Ok(outcome) => Ok(Resolution::Outcome(outcome)),
        Err(err) if err.is_cancelled() => Ok(Resolution::Cancelled),
        Err(err) => Err(err.into()),
    }
}

fn resolve(args: ResolveArgs, config: &PimConfig, mode: InteractiveMode) -> Result<ExitCode> {
    let kind = args.kind;
    let target = resolve_target(kind, &args.input, args.scope, args.subscription, config)?;
    if let Some(alias) = &target.alias {
        output::note(&format!("Using alias '{}' (role '{}')", alias, target.input));
    }

    let resolution = run_resolution(
        kind,
        &target,
        args.candidates.as_deref(),
        &config.resolver,
        mode,
        DialoguerPrompt,
    )?;

    match &resolution {
        Resolution::Expanded(path) if args.json => {
            println!("{}", serde_json::json!({ "scope": path }));
        }
        Resolution::Expanded(path) => println!("{}", path),
        Resolution::Cancelled => output::warning("Selection cancelled"),
        Resolution::Outcome(outcome) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(outcome).context("Failed to render outcome")?
                );
            } else if let Some(found) = outcome.resolved() {
                output::resolved(found);
            }

            if let Some(message) = report::describe(kind, &target.input, outcome) {
                if outcome.is_resolved() {
                    output::note(&message);
                } else {
                    output::error(&message);
                }
            }
        }
    }

    Ok(ExitCode::from(resolution.exit_code()))
}

/// Resolution by format alone, when no candidate listing is available
fn expand_unlisted(kind: CandidateKind, input: &str, subscription: Option<&str>) -> Result<String> {
    if kind != CandidateKind::Scope {
        anyhow::bail!("--candidates is required to resolve a {}", kind);
    }

    expand_scope(input, subscription).with_context(|| {
        format!(
            "Cannot expand scope '{}' without a candidate listing; pass --subscription or --candidates",
            input
        )
    })
}

fn list(kind: CandidateKind, candidates: &Path) -> Result<ExitCode> {
    let listed = source::load_candidates(candidates)?;
    if listed.is_empty() {
        output::note(&format!("No {} found", kind.plural()));
    } else {
        output::numbered(&listed);
    }
    Ok(ExitCode::SUCCESS)
}

fn alias(action: AliasCommand, config: &mut PimConfig) -> Result<ExitCode> {
    match action {
        AliasCommand::List { prefix } => {
            let entries: Vec<(&str, &Alias)> = match prefix.as_deref() {
                Some(prefix) => config.aliases_with_prefix(prefix).into_iter().collect(),
                None => config
                    .aliases
                    .iter()
                    .map(|(name, alias)| (name.as_str(), alias))
                    .collect(),
            };

            if entries.is_empty() {
                output::note("No aliases configured");
            }
            for (name, alias) in entries {
                println!("{}", alias_line(name, alias));
            }
        }
        AliasCommand::Show { name } => {
            let alias = config
                .get_alias(&name)
                .with_context(|| format!("Alias '{}' not found", name))?;
            print!("{}", serde_yaml::to_string(alias).context("Failed to render alias")?);
        }
        AliasCommand::Add { name, fields } => {
            if alias_prefix(&name).is_none() {
                output::warning(&format!(
                    "Alias names should start with one of: {}",
                    ALIAS_PREFIXES.map(|p| format!("{}:", p)).join(", ")
                ));
            }
            config.add_alias(name.clone(), fields.into())?;
            output::success(&format!("Alias '{}' saved to {}", name, config.path().display()));
        }
        AliasCommand::Remove { name } => {
            if config.remove_alias(&name)? {
                output::success(&format!("Alias '{}' removed", name));
            } else {
                output::warning(&format!("Alias '{}' not found", name));
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn alias_line(name: &str, alias: &Alias) -> String {
    let mut line = format!("{}: {}", name, alias.role.as_deref().unwrap_or("-"));
    if let Some(scope) = &alias.scope {
        line.push_str(&format!(" @ {}", scope));
    }
    if let Some(hours) = alias.duration_hours() {
        line.push_str(&format!(" ({}h)", hours));
    }
    line
}

/// Accepts hours (`4`, `2.5`) or an ISO 8601 duration (`PT4H`, `PT2H30M`)
fn parse_duration_arg(value: &str) -> Result<String, String> {
    normalize_duration(value)
        .ok_or_else(|| format!("'{}' is not a duration; use hours (4) or PT4H", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pimctl_resolver::Selection;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from([
            "pimctl",
            "resolve",
            "role",
            "owner",
            "--candidates",
            "roles.json",
            "--scope",
            "/subscriptions/abc",
            "--non-interactive",
        ])
        .unwrap();

        assert!(cli.non_interactive);
        match cli.command {
            Command::Resolve(args) => {
                assert_eq!(args.kind, CandidateKind::Role);
                assert_eq!(args.input, "owner");
                assert_eq!(args.scope.as_deref(), Some("/subscriptions/abc"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["pimctl", "list", "widget", "--candidates", "x.json"]).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = ResolverOverrides {
            fuzzy: Some(false),
            fuzzy_threshold: Some(0.6),
            cache_ttl: Some(10),
        };
        let mut config = ResolverConfig::default();
        overrides.apply(&mut config);

        assert!(!config.fuzzy_enabled);
        assert_eq!(config.fuzzy_threshold, 0.6);
        assert_eq!(config.cache_ttl_seconds, 10);

        let mut untouched = ResolverConfig::default();
        ResolverOverrides::default().apply(&mut untouched);
        assert_eq!(untouched, ResolverConfig::default());
    }

    #[test]
    fn test_parse_duration_arg() {
        assert_eq!(parse_duration_arg("PT4H").unwrap(), "PT4H");
        assert_eq!(parse_duration_arg("4").unwrap(), "PT4H");
        assert_eq!(parse_duration_arg("2.5").unwrap(), "PT2H30M");
        assert_eq!(parse_duration_arg("0.5").unwrap(), "PT30M");
        assert_eq!(parse_duration_arg("PT2H30M").unwrap(), "PT2H30M");
        assert!(parse_duration_arg("0").is_err());
        assert!(parse_duration_arg("soon").is_err());
    }

    #[test]
    fn test_alias_fields_into_alias() {
        let alias: Alias = AliasFields {
            role: Some("Owner".to_string()),
            resource_group: Some("my-rg".to_string()),
            ..Default::default()
        }
        .into();

        assert_eq!(alias.role.as_deref(), Some("Owner"));
        assert_eq!(alias.resource_group.as_deref(), Some("my-rg"));
        assert!(alias.scope.is_none());
    }

    #[test]
    fn test_alias_line() {
        let alias = Alias {
            role: Some("Owner".to_string()),
            scope: Some("directory".to_string()),
            duration: Some("PT4H".to_string()),
            ..Default::default()
        };
        assert_eq!(alias_line("res:prod", &alias), "res:prod: Owner @ directory (4h)");
        assert_eq!(alias_line("empty", &Alias::default()), "empty: -");
    }

    // =========================================================================
    // Resolve command
    // =========================================================================

    fn alias_config() -> PimConfig {
        let mut config = PimConfig::with_defaults("unused.yml");
        config.aliases.insert(
            "res:prod".to_string(),
            Alias {
                role: Some("Owner".to_string()),
                scope: Some("/subscriptions/sub-1".to_string()),
                resource_group: Some("ignored-rg".to_string()),
                ..Default::default()
            },
        );
        config.aliases.insert(
            "res:rg".to_string(),
            Alias {
                role: Some("Reader".to_string()),
                subscription: Some("sub-2".to_string()),
                resource_group: Some("app-rg".to_string()),
                ..Default::default()
            },
        );
        config.aliases.insert(
            "res:norole".to_string(),
            Alias {
                scope: Some("/subscriptions/sub-1".to_string()),
                ..Default::default()
            },
        );
        config
    }

    fn role_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("roles.json");
        std::fs::write(
            &path,
            r#"[
                {"display_name": "Owner", "id": "role-owner"},
                {"display_name": "Storage Reader", "id": "role-sr"},
                {"display_name": "Storage Writer", "id": "role-sw"}
            ]"#,
        )
        .unwrap();
        path
    }

    fn target(input: &str) -> Target {
        Target {
            input: input.to_string(),
            scope: None,
            subscription: None,
            alias: None,
        }
    }

    fn no_prompt(_: &str, _: &[String]) -> io::Result<Selection> {
        panic!("prompted unexpectedly")
    }

    #[test]
    fn test_alias_scope_wins_over_resource_group_and_flag() {
        let config = alias_config();
        let target = resolve_target(
            CandidateKind::Role,
            " res:prod ",
            Some("/subscriptions/flag".to_string()),
            None,
            &config,
        )
        .unwrap();

        assert_eq!(target.input, "Owner");
        assert_eq!(target.scope.as_deref(), Some("/subscriptions/sub-1"));
        assert_eq!(target.alias.as_deref(), Some("res:prod"));
    }

    #[test]
    fn test_alias_resource_group_uses_alias_subscription() {
        let config = alias_config();
        let target = resolve_target(
            CandidateKind::Role,
            "res:rg",
            Some("/subscriptions/flag".to_string()),
            Some("sub-flag".to_string()),
            &config,
        )
        .unwrap();

        assert_eq!(target.input, "Reader");
        assert_eq!(target.subscription.as_deref(), Some("sub-2"));
        assert_eq!(
            target.scope.as_deref(),
            Some("/subscriptions/sub-2/resourceGroups/app-rg")
        );
    }

    #[test]
    fn test_plain_input_keeps_flags() {
        let config = alias_config();
        let target = resolve_target(
            CandidateKind::Role,
            "owner",
            Some("/subscriptions/flag".to_string()),
            Some("sub-flag".to_string()),
            &config,
        )
        .unwrap();

        assert_eq!(target.input, "owner");
        assert_eq!(target.scope.as_deref(), Some("/subscriptions/flag"));
        assert_eq!(target.subscription.as_deref(), Some("sub-flag"));
        assert!(target.alias.is_none());
    }

    #[test]
    fn test_alias_without_role_is_an_error() {
        let config = alias_config();
        let err = resolve_target(CandidateKind::Role, "res:norole", None, None, &config).unwrap_err();
        assert!(err.to_string().contains("does not name a role"));
    }

    #[test]
    fn test_aliases_only_apply_to_roles() {
        let config = alias_config();
        let scope = resolve_target(CandidateKind::Scope, "res:prod", None, None, &config).unwrap();
        assert_eq!(scope, target("res:prod"));
    }

    #[test]
    fn test_scope_without_listing_is_expanded() {
        let mut scope = target("app-rg");
        scope.subscription = Some("sub-1".to_string());

        let resolution = run_resolution(
            CandidateKind::Scope,
            &scope,
            None,
            &ResolverConfig::default(),
            InteractiveMode::NonInteractive,
            no_prompt,
        )
        .unwrap();

        match &resolution {
            Resolution::Expanded(path) => {
                assert_eq!(path, "/subscriptions/sub-1/resourceGroups/app-rg")
            }
            other => panic!("unexpected resolution {:?}", other),
        }
        assert_eq!(resolution.exit_code(), 0);
    }

    #[test]
    fn test_unlisted_inputs_that_cannot_expand_fail() {
        let config = ResolverConfig::default();
        let mode = InteractiveMode::NonInteractive;

        let err = run_resolution(CandidateKind::Role, &target("owner"), None, &config, mode, no_prompt)
            .unwrap_err();
        assert!(err.to_string().contains("--candidates is required"));

        let err = run_resolution(CandidateKind::Scope, &target("app-rg"), None, &config, mode, no_prompt)
            .unwrap_err();
        assert!(err.to_string().contains("Cannot expand scope"));
    }

    #[test]
    fn test_resolution_exit_codes() {
        let dir = TempDir::new().unwrap();
        let roles = role_file(&dir);
        let config = ResolverConfig::default();
        let run = |input: &str, mode: InteractiveMode| {
            run_resolution(CandidateKind::Role, &target(input), Some(roles.as_path()), &config, mode, no_prompt)
                .unwrap()
        };

        let resolved = run("owner", InteractiveMode::NonInteractive);
        match &resolved {
            Resolution::Outcome(ResolutionOutcome::Resolved(found)) => {
                assert_eq!(found.candidate.id, "role-owner")
            }
            other => panic!("unexpected resolution {:?}", other),
        }
        assert_eq!(resolved.exit_code(), 0);

        assert_eq!(run("Key Vault Administrator", InteractiveMode::NonInteractive).exit_code(), EXIT_NOT_FOUND);
        assert_eq!(run("storage", InteractiveMode::NonInteractive).exit_code(), EXIT_AMBIGUOUS);
    }

    #[test]
    fn test_cancelled_selection_exits_130() {
        let dir = TempDir::new().unwrap();
        let roles = role_file(&dir);

        let resolution = run_resolution(
            CandidateKind::Role,
            &target("storage"),
            Some(roles.as_path()),
            &ResolverConfig::default(),
            InteractiveMode::Interactive,
            |_: &str, _: &[String]| -> io::Result<Selection> { Ok(Selection::Cancelled) },
        )
        .unwrap();

        assert!(matches!(resolution, Resolution::Cancelled));
        assert_eq!(resolution.exit_code(), EXIT_CANCELLED);
    }

    #[test]
    fn test_missing_candidate_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = run_resolution(
            CandidateKind::Role,
            &target("owner"),
            Some(dir.path().join("missing.json").as_path()),
            &ResolverConfig::default(),
            InteractiveMode::NonInteractive,
            no_prompt,
        )
        .unwrap_err();

        assert!(format!("{:#}", err).contains("Failed to read candidate file"));
    }
}
