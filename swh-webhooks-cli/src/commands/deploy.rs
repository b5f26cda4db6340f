use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use swh_webhooks_core::deployment::SvixServerEnv;

#[derive(Subcommand, Debug)]
pub enum DeployCommand {
    /// Validate the environment file of the Svix server
    Check {
        /// Environment file, usually deploy/svix.env
        env_file: PathBuf,
        /// Print the environment in canonical form instead of a summary
        #[arg(long)]
        render: bool,
    },
}

impl DeployCommand {
    pub fn run(self, out: &mut dyn Write) -> anyhow::Result<()> {
        match self {
            DeployCommand::Check { env_file, render } => {
                let env = SvixServerEnv::from_file(&env_file)
                    .with_context(|| format!("invalid Svix environment {}", env_file.display()))?;
                if render {
                    write!(out, "{}", env.render())?;
                } else {
                    write_summary(&env, out)?;
                }
            }
        }
        Ok(())
    }
}

fn write_summary(env: &SvixServerEnv, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "listen address: {}", env.listen_address)?;
    writeln!(out, "queue: {}", env.queue_type)?;
    writeln!(out, "cache: {}", env.cache_type)?;
    writeln!(
        out,
        "delivery attempts: {} over {}s",
        env.max_attempts(),
        env.retry_window().as_secs()
    )?;
    writeln!(out, "https only: {}", env.endpoint_https_only)?;
    if !env.whitelist_subnets.is_empty() {
        let subnets: Vec<String> = env.whitelist_subnets.iter().map(ToString::to_string).collect();
        writeln!(out, "whitelisted subnets: {}", subnets.join(", "))?;
    }
    Ok(())
}
