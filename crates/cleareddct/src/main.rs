//! `cleareddct` - CLI for cleareddct
//!
//! This binary provides the command-line interface for drafting flight
//! plans, generating ATS messages and managing the outbox.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cleareddct::cli::{Cli, Command, ConfigCommand, MessageCommand, OutboxCommand, PlanCommand};
use cleareddct::store::read_json;
use cleareddct::{
    init_logging, mailer_from_config, Config, Error, Field, FieldSource, FlightPlan, MailTransport,
    MessageType, RawFlightPlan, Session,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        // Input and delivery problems are reported inline; the stores are intact.
        Err(err) if err.downcast_ref::<Error>().is_some_and(Error::is_user_error) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Plan(plan_cmd) => handle_plan(config, plan_cmd),
        Command::Message(message_cmd) => handle_message(config, &message_cmd),
        Command::Outbox(outbox_cmd) => handle_outbox(config, outbox_cmd).await,
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_plan(config: Config, cmd: PlanCommand) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;

    match cmd {
        PlanCommand::Create { id, fields } => {
            let mut plan = FlightPlan::new(id);
            fields.apply(&mut plan);
            let key = plan.identification().to_string();
            session.plans_mut().create_or_update(plan)?;
            println!("Flight plan {key} saved.");
        }
        PlanCommand::Edit { key, id, fields } => {
            let mut plan = FlightPlan::from_partial(session.plan(&key)?);
            if let Some(id) = id {
                plan.set(Field::Identification, id);
            }
            fields.apply(&mut plan);
            let new_key = plan.identification().to_string();
            session.plans_mut().rename_and_update(&key, plan)?;
            if new_key == key {
                println!("Flight plan {key} updated.");
            } else {
                println!("Flight plan {key} saved as {new_key}.");
            }
        }
        PlanCommand::Delete { key } => {
            if session.plans_mut().delete(&key)? {
                println!("Flight plan {key} deleted.");
            } else {
                println!("No flight plan {key}; nothing deleted.");
            }
        }
        PlanCommand::List { json } => {
            let plans = session.plans();
            if json {
                println!("{}", serde_json::to_string_pretty(plans.plans())?);
            } else if plans.is_empty() {
                println!("No flight plans saved yet.");
            } else {
                println!("{:<8} {:<6} {:<5} {:<5} {:<5}", "IDENT", "RULES", "TYPE", "DEP", "DEST");
                for (key, plan) in plans.plans() {
                    println!(
                        "{:<8} {:<6} {:<5} {:<5} {:<5}{}",
                        key,
                        format!("{}{}", plan.get(Field::FlightRules), plan.get(Field::FlightType)),
                        plan.get(Field::AircraftType),
                        plan.get(Field::Departure),
                        plan.get(Field::Destination),
                        if plan.is_complete() { "" } else { " (incomplete)" },
                    );
                }
            }
        }
        PlanCommand::Show { key, json } => {
            let plan = session.plan(&key)?;
            if json {
                println!("{}", serde_json::to_string_pretty(plan)?);
            } else {
                for field in Field::ALL {
                    let value = plan.lookup(field).unwrap_or("<missing>");
                    println!("{:<38} {value}", field.label());
                }
            }
        }
    }
    Ok(())
}

fn handle_message(config: Config, cmd: &MessageCommand) -> anyhow::Result<()> {
    let kind: MessageType = cmd.kind.parse()?;
    let addendum = cmd.info.as_deref().unwrap_or_default();
    if !addendum.is_empty() && !kind.takes_addendum() {
        return Err(
            Error::validation(format!("{kind} messages take no additional information")).into(),
        );
    }

    let mut session = Session::open(config)?;
    let message = match (&cmd.record, &cmd.key) {
        (Some(path), _) => {
            let record: RawFlightPlan = read_json(path)?
                .ok_or_else(|| Error::validation(format!("{} does not exist", path.display())))?;
            if cmd.dry_run {
                cleareddct::format_message(&record, kind, addendum)?
            } else {
                session.generate_message_from(&record, kind.as_str(), addendum)?
            }
        }
        (None, Some(key)) => {
            if cmd.dry_run {
                cleareddct::format_message(session.plan(key)?, kind, addendum)?
            } else {
                session.generate_message(key, kind.as_str(), addendum)?
            }
        }
        (None, None) => {
            return Err(Error::validation("a flight plan key or --record is required").into())
        }
    };

    println!("{message}");
    if !cmd.dry_run {
        eprintln!("Message saved to outbox ({} total).", session.outbox().len());
    }
    Ok(())
}

async fn handle_outbox(config: Config, cmd: OutboxCommand) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;

    match cmd {
        OutboxCommand::List { json } => {
            let messages = session.outbox().messages();
            if json {
                println!("{}", serde_json::to_string_pretty(messages)?);
            } else if messages.is_empty() {
                println!("Outbox is empty.");
            } else {
                for message in messages {
                    println!("{message}");
                }
            }
        }
        OutboxCommand::Clear => {
            session.outbox_mut().clear()?;
            println!("Outbox cleared.");
        }
        OutboxCommand::Export { header, output } => {
            let header = header.resolve(&session.config().export);
            let path = session.export(&header, output.as_deref())?;
            println!("Outbox exported to {}", path.display());
        }
        OutboxCommand::Mail {
            to,
            from,
            subject,
            fresh,
            header,
        } => {
            let header = header.resolve(&session.config().export);
            let mailer = mailer_from_config(&session.config().mail);
            session
                .mail_export(
                    &*mailer,
                    &to,
                    from.as_deref(),
                    subject.as_deref(),
                    &header,
                    fresh,
                )
                .await?;
            println!("Exported outbox emailed to {to}.");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Flight plans:       {}", config.flight_plans_path().display());
                println!("  Outbox:             {}", config.outbox_path().display());
                println!("  Export file:        {}", config.export_path().display());
                println!();
                println!("[Export]");
                println!("  Sender name:        {}", config.export.sender_name);
                println!("  Originator:         {}", config.export.originator);
                println!("  Lesson:             {}", config.export.lesson);
                println!();
                println!("[Mail]");
                println!("  From:               {}", config.mail.from);
                println!("  Subject:            {}", config.mail.subject);
                match config.mail.transport {
                    MailTransport::Smtp => {
                        println!(
                            "  SMTP relay:         {}:{} (STARTTLS)",
                            config.mail.smtp_host, config.mail.smtp_port
                        );
                        println!("  SMTP login:         {}", config.mail.smtp_login());
                        println!(
                            "  SMTP password:      {}",
                            if config.mail.smtp_password.is_empty() { "not set" } else { "set" }
                        );
                    }
                    MailTransport::Sendmail => {
                        println!(
                            "  Sendmail:           {} {}",
                            config.mail.sendmail_command,
                            config.mail.sendmail_args.join(" ")
                        );
                    }
                }
                println!("  Timeout:            {}s", config.mail_timeout().as_secs());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("validating {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
