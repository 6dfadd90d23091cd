//! `usermap create useridentitymapping <IDENTITY_NAME> <USER_NAME>`
//!
//! Runs in three phases: `complete` extracts arguments and flags and builds
//! the API client, `validate` checks the result, `run` creates the mapping
//! and prints it.

use std::io::Write;

use anyhow::{anyhow, bail, Result};
use clap::Args;
use tracing::{debug, info};

use usermap_core::client::{ClientFactory, UserIdentityMappingInterface};
use usermap_core::models::UserIdentityMapping;
use usermap_core::printer::{print_success, ObjectPrinter, OutputFormat};

pub const LONG_ABOUT: &str = "\
Manually map an identity to a user.

Typically, identities are automatically mapped to users during login. If automatic
mapping is disabled (by using the \"lookup\" mapping method), or a mapping needs to
be manually established between an identity and a user, this command can be used
to create a useridentitymapping object.";

pub const EXAMPLES: &str = "\
Examples:
  # Map the identity \"acme_ldap:adamjones\" to the user \"ajones\"
  usermap create useridentitymapping acme_ldap:adamjones ajones";

/// Flags and positional arguments of the subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct UserIdentityMappingArgs {
    /// Identity name, then user name.
    #[arg(value_name = "IDENTITY_NAME USER_NAME")]
    pub args: Vec<String>,

    /// Only print the object that would be sent, without sending it.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format: one of json, yaml, name.
    #[arg(short, long, value_name = "FORMAT")]
    pub output: Option<String>,
}

/// State carried from `complete` through `run`.
pub struct CreateUserIdentityMappingOptions<C, W> {
    pub user: String,
    pub identity: String,

    pub client: Option<C>,

    pub dry_run: bool,

    pub out: Option<W>,
    pub printer: Option<ObjectPrinter>,
}

impl<C, W> CreateUserIdentityMappingOptions<C, W>
where
    C: UserIdentityMappingInterface,
    W: Write,
{
    pub fn new(out: W) -> Self {
        Self {
            user: String::new(),
            identity: String::new(),
            client: None,
            dry_run: false,
            out: Some(out),
            printer: None,
        }
    }

    /// Extract arguments and flags, then build the API client.
    ///
    /// Argument-count errors are returned before the client factory is
    /// touched.
    pub fn complete<F>(&mut self, args: &UserIdentityMappingArgs, factory: &F) -> Result<()>
    where
        F: ClientFactory<Client = C>,
    {
        match args.args.as_slice() {
            [] => bail!("identity is required"),
            [_] => bail!("user name is required"),
            [identity, user] => {
                self.identity = identity.clone();
                self.user = user.clone();
            }
            all => bail!(
                "exactly two arguments (identity and user name) are supported, not: [{}]",
                all.join(" ")
            ),
        }

        self.dry_run = args.dry_run;

        self.client = Some(factory.user_identity_mappings()?);

        let format: OutputFormat = args.output.as_deref().unwrap_or_default().parse()?;
        self.printer = Some(ObjectPrinter::new(format));

        debug!(
            identity = %self.identity,
            user = %self.user,
            dry_run = self.dry_run,
            output = %format,
            "completed options"
        );
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.identity.is_empty() {
            bail!("identity is required");
        }
        if self.user.is_empty() {
            bail!("user is required");
        }
        if self.client.is_none() {
            bail!("UserIdentityMappingClient is required");
        }
        if self.out.is_none() {
            bail!("Out is required");
        }
        if self.printer.is_none() {
            bail!("Printer is required");
        }

        Ok(())
    }

    /// Create the mapping (unless dry-run) and print the result.
    pub async fn run(&mut self) -> Result<()> {
        let mapping = UserIdentityMapping::new(&self.identity, &self.user);

        let actual_mapping = if self.dry_run {
            mapping
        } else {
            let client = self
                .client
                .as_ref()
                .ok_or_else(|| anyhow!("UserIdentityMappingClient is required"))?;
            let created = client.create(&mapping).await?;
            info!(name = %created.name(), "useridentitymapping created");
            created
        };

        let out = self
            .out
            .as_mut()
            .ok_or_else(|| anyhow!("Out is required"))?;
        let printer = self
            .printer
            .as_ref()
            .ok_or_else(|| anyhow!("Printer is required"))?;

        let format = printer.format();
        if format.prints_success() {
            print_success(format.is_short(), out, &actual_mapping, self.dry_run, "created")?;
        } else {
            printer.print(&actual_mapping, out)?;
        }
        Ok(())
    }
}

/// Complete, validate and run the command, writing results to `out`.
pub async fn run_create_user_identity_mapping<F, W>(
    args: &UserIdentityMappingArgs,
    factory: &F,
    out: W,
) -> Result<()>
where
    F: ClientFactory,
    W: Write,
{
    let mut options = CreateUserIdentityMappingOptions::<F::Client, W>::new(out);
    options.complete(args, factory)?;
    options.validate()?;
    options.run().await
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use usermap_core::errors::{ApiError, ConfigError};

    use super::*;

    /// Records every create call; optionally fails with a `Status` error.
    #[derive(Clone, Default)]
    struct FakeClient {
        calls: Arc<Mutex<Vec<UserIdentityMapping>>>,
        conflict: bool,
    }

    #[async_trait]
    impl UserIdentityMappingInterface for FakeClient {
        async fn create(
            &self,
            mapping: &UserIdentityMapping,
        ) -> Result<UserIdentityMapping, ApiError> {
            self.calls.lock().unwrap().push(mapping.clone());
            if self.conflict {
                return Err(ApiError::Status {
                    code: 409,
                    reason: "AlreadyExists".into(),
                    message: format!(
                        "useridentitymappings \"{}\" already exists",
                        mapping.identity.name
                    ),
                });
            }
            let mut stored = mapping.clone();
            stored.metadata.name = format!("{}-from-server", mapping.identity.name);
            stored.metadata.uid = Some("uid-1".into());
            stored.user.uid = Some("user-uid-1".into());
            Ok(stored)
        }
    }

    #[derive(Default)]
    struct FakeFactory {
        client: FakeClient,
        fail: bool,
        built: Cell<usize>,
    }

    impl ClientFactory for FakeFactory {
        type Client = FakeClient;

        fn user_identity_mappings(&self) -> Result<FakeClient, ConfigError> {
            self.built.set(self.built.get() + 1);
            if self.fail {
                return Err(ConfigError::MissingServer);
            }
            Ok(self.client.clone())
        }
    }

    fn cli_args(args: &[&str]) -> UserIdentityMappingArgs {
        UserIdentityMappingArgs {
            args: args.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    async fn run_to_string(
        args: &UserIdentityMappingArgs,
        factory: &FakeFactory,
    ) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run_create_user_identity_mapping(args, factory, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_zero_args() {
        let factory = FakeFactory::default();
        let (result, out) = run_to_string(&cli_args(&[]), &factory).await;
        assert_eq!(result.unwrap_err().to_string(), "identity is required");
        assert_eq!(factory.built.get(), 0);
        assert!(factory.client.calls.lock().unwrap().is_empty());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_one_arg() {
        let factory = FakeFactory::default();
        let (result, _) = run_to_string(&cli_args(&["acme_ldap:adamjones"]), &factory).await;
        assert_eq!(result.unwrap_err().to_string(), "user name is required");
        assert_eq!(factory.built.get(), 0);
    }

    #[tokio::test]
    async fn test_too_many_args() {
        let factory = FakeFactory::default();
        let (result, _) =
            run_to_string(&cli_args(&["acme_ldap:adamjones", "ajones", "extra"]), &factory).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "exactly two arguments (identity and user name) are supported, not: [acme_ldap:adamjones ajones extra]"
        );
        assert_eq!(factory.built.get(), 0);
        assert!(factory.client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_prints_server_object_name() {
        let factory = FakeFactory::default();
        let (result, out) =
            run_to_string(&cli_args(&["acme_ldap:adamjones", "ajones"]), &factory).await;
        result.unwrap();

        let calls = factory.client.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].identity.name, "acme_ldap:adamjones");
        assert_eq!(calls[0].user.name, "ajones");
        assert_eq!(
            out,
            "useridentitymapping \"acme_ldap:adamjones-from-server\" created\n"
        );
    }

    #[tokio::test]
    async fn test_dry_run_skips_create() {
        let factory = FakeFactory::default();
        let mut args = cli_args(&["acme_ldap:adamjones", "ajones"]);
        args.dry_run = true;

        let (result, out) = run_to_string(&args, &factory).await;
        result.unwrap();

        assert!(factory.client.calls.lock().unwrap().is_empty());
        assert_eq!(
            out,
            "useridentitymapping \"acme_ldap:adamjones\" created (dry run)\n"
        );
    }

    #[tokio::test]
    async fn test_output_name() {
        let factory = FakeFactory::default();
        let mut args = cli_args(&["acme_ldap:adamjones", "ajones"]);
        args.output = Some("name".into());

        let (result, out) = run_to_string(&args, &factory).await;
        result.unwrap();
        assert_eq!(out, "useridentitymapping/acme_ldap:adamjones-from-server\n");
    }

    #[tokio::test]
    async fn test_output_json_prints_full_object() {
        let factory = FakeFactory::default();
        let mut args = cli_args(&["acme_ldap:adamjones", "ajones"]);
        args.output = Some("json".into());

        let (result, out) = run_to_string(&args, &factory).await;
        result.unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["metadata"]["uid"], "uid-1");
        assert_eq!(value["user"]["uid"], "user-uid-1");
    }

    #[tokio::test]
    async fn test_unknown_output_fails_before_create() {
        let factory = FakeFactory::default();
        let mut args = cli_args(&["acme_ldap:adamjones", "ajones"]);
        args.output = Some("wide".into());

        let (result, out) = run_to_string(&args, &factory).await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unable to match a printer suitable for the output format \"wide\""));
        assert!(factory.client.calls.lock().unwrap().is_empty());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_remote_error_propagates_unmodified() {
        let factory = FakeFactory {
            client: FakeClient {
                conflict: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let (result, out) =
            run_to_string(&cli_args(&["acme_ldap:adamjones", "ajones"]), &factory).await;

        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error from server (AlreadyExists): useridentitymappings \"acme_ldap:adamjones\" already exists"
        );
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Status { code: 409, .. })
        ));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_client_build_error_is_surfaced() {
        let factory = FakeFactory {
            fail: true,
            ..Default::default()
        };
        let (result, _) =
            run_to_string(&cli_args(&["acme_ldap:adamjones", "ajones"]), &factory).await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), ConfigError::MissingServer.to_string());
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    async fn run_with_format(format: OutputFormat, dry_run: bool) -> String {
        let mut options = CreateUserIdentityMappingOptions::new(Vec::new());
        options.identity = "acme_ldap:adamjones".into();
        options.user = "ajones".into();
        options.client = Some(FakeClient::default());
        options.dry_run = dry_run;
        options.printer = Some(ObjectPrinter::new(format));
        options.validate().unwrap();
        options.run().await.unwrap();
        String::from_utf8(options.out.take().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_run_follows_printer_format() {
        assert_eq!(
            run_with_format(OutputFormat::Default, false).await,
            "useridentitymapping \"acme_ldap:adamjones-from-server\" created\n"
        );
        assert_eq!(
            run_with_format(OutputFormat::Name, true).await,
            "useridentitymapping/acme_ldap:adamjones (dry run)\n"
        );

        let yaml = run_with_format(OutputFormat::Yaml, false).await;
        assert!(yaml.contains("kind: UserIdentityMapping"));
        assert!(yaml.contains("uid: user-uid-1"));
        assert!(!yaml.contains("created"));
    }

    #[test]
    fn test_validate_checks() {
        let mut options = CreateUserIdentityMappingOptions::<FakeClient, Vec<u8>>::new(Vec::new());
        assert_eq!(options.validate().unwrap_err().to_string(), "identity is required");

        options.identity = "acme_ldap:adamjones".into();
        assert_eq!(options.validate().unwrap_err().to_string(), "user is required");

        options.user = "ajones".into();
        assert_eq!(
            options.validate().unwrap_err().to_string(),
            "UserIdentityMappingClient is required"
        );

        options.client = Some(FakeClient::default());
        assert_eq!(options.validate().unwrap_err().to_string(), "Printer is required");

        options.printer = Some(ObjectPrinter::default());
        options.validate().unwrap();

        options.out = None;
        assert_eq!(options.validate().unwrap_err().to_string(), "Out is required");
    }

    #[test]
    fn test_empty_names_rejected_by_validate() {
        let factory = FakeFactory::default();
        let mut options = CreateUserIdentityMappingOptions::new(Vec::new());
        options.complete(&cli_args(&["", "ajones"]), &factory).unwrap();
        assert_eq!(options.validate().unwrap_err().to_string(), "identity is required");
    }
}
