use std::path::Path;

use anyhow::{Context, Result, bail};
use httpiness_application::ResolvedRequest;
use httpiness_application::variable_resolver::VariableStore;
use httpiness_domain::collection::{Collection, NodeId};
use httpiness_domain::document::CURRENT_VERSION;
use httpiness_domain::request::{FormEncoding, RequestBody};
use httpiness_infrastructure::adapters::encode_form;
use tracing::warn;

use crate::cli::{Commands, VarsAction};
use crate::services::{Registry, Services};

pub async fn run(command: Commands, services: &mut Services) -> Result<()> {
    match command {
        Commands::Preview {
            collection,
            request,
            preset,
        } => preview(services, &collection, &request, preset.as_deref()).await,
        Commands::Send {
            collection,
            request,
            preset,
            include,
        } => send(services, &collection, &request, preset.as_deref(), include).await,
        Commands::Migrate { collection, output } => {
            migrate(services, &collection, output.as_deref()).await
        }
        Commands::Vars { collection, action } => vars(services, &collection, action).await,
    }
}

/// Opens the collection at `path`, applying `preset` when given.
///
/// A preset writes sensitive values to the secret store, so the document is
/// saved right away to keep both in step.
async fn open<'a>(
    registry: &'a mut Registry,
    variables: &VariableStore,
    path: &Path,
    preset: Option<&str>,
) -> Result<&'a mut Collection> {
    let collection = registry
        .open(path)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;
    let uuid = collection.uuid().to_string();
    if let Some(preset) = preset {
        variables.apply_preset(collection, preset).await?;
        if collection.is_dirty() {
            registry.save(&uuid, None).await?;
        }
    }
    registry
        .get_mut(&uuid)
        .with_context(|| format!("{} is no longer open", path.display()))
}

fn find_request(collection: &Collection, path: &str) -> Result<NodeId> {
    let root = collection.tree.root();
    match collection.tree.find_from_absolute_path(root, path) {
        Some(id) if collection.tree.request(id).is_ok() => Ok(id),
        Some(_) => bail!("{path} is not a request"),
        None => bail!("no request at {path} in {}", collection.name()),
    }
}

async fn preview(
    services: &mut Services,
    path: &Path,
    request: &str,
    preset: Option<&str>,
) -> Result<()> {
    let Services {
        registry,
        variables,
        preview,
        ..
    } = services;
    let collection: &Collection = open(registry, variables, path, preset).await?;
    let id = find_request(collection, request)?;
    let resolution = preview.execute(collection, id).await?;
    for name in &resolution.unresolved {
        warn!(variable = %name, "variable is not defined");
    }
    print!("{}", render(&resolution.request)?);
    Ok(())
}

async fn send(
    services: &mut Services,
    path: &Path,
    request: &str,
    preset: Option<&str>,
    include: bool,
) -> Result<()> {
    let Services {
        registry,
        variables,
        send,
        ..
    } = services;
    let collection: &Collection = open(registry, variables, path, preset).await?;
    let id = find_request(collection, request)?;
    let result = send.execute(collection, id).await?;

    let Some(response) = result.response else {
        bail!(
            "{}",
            result
                .metadata
                .error_message
                .unwrap_or_else(|| "no response".to_string())
        );
    };
    println!(
        "{} ({} ms)",
        response.status,
        result.metadata.duration.as_millis()
    );
    if include {
        for header in &response.headers {
            println!("{}: {}", header.name, header.value);
        }
    }
    println!();
    println!("{}", response.body);
    if !response.is_success() {
        bail!("request failed with status {}", response.status);
    }
    Ok(())
}

async fn migrate(services: &mut Services, path: &Path, output: Option<&Path>) -> Result<()> {
    let uuid = open(&mut services.registry, &services.variables, path, None)
        .await?
        .uuid()
        .to_string();
    services.registry.save(&uuid, output).await?;
    let written = output.unwrap_or(path);
    println!("wrote {} ({})", written.display(), CURRENT_VERSION.as_str());
    Ok(())
}

async fn vars(services: &mut Services, path: &Path, action: VarsAction) -> Result<()> {
    let variables = &services.variables;
    let collection = open(&mut services.registry, variables, path, None).await?;
    match action {
        VarsAction::List => {
            for name in collection.variable_names() {
                let value = if collection.is_sensitive(name) {
                    "<sensitive>"
                } else {
                    collection.public_value(name)
                };
                println!("{name} = {value}");
            }
            for preset in collection.presets() {
                let entries: Vec<String> = preset
                    .macros
                    .iter()
                    .map(|e| format!("{}={}", e.name, e.value))
                    .collect();
                println!("preset {}: {}", preset.name, entries.join(", "));
            }
        }
        VarsAction::Set {
            name,
            value,
            sensitive,
        } => {
            variables
                .set_variable(collection, &name, Some(&value), sensitive)
                .await?;
        }
        VarsAction::Unset { name } => {
            if !variables.remove_variable(collection, &name).await? {
                bail!("no variable named {name}");
            }
        }
        VarsAction::Apply { preset } => variables.apply_preset(collection, &preset).await?,
        VarsAction::Capture { preset, names } => {
            let names = if names.is_empty() {
                collection.variable_names().map(str::to_string).collect()
            } else {
                names
            };
            variables.capture_preset(collection, &preset, &names).await?;
        }
    }

    if collection.is_dirty() {
        let uuid = collection.uuid().to_string();
        services.registry.save(&uuid, None).await?;
    }
    Ok(())
}

fn render(request: &ResolvedRequest) -> Result<String> {
    let mut out = format!("{} {}\n", request.method, request.url);
    for header in &request.headers {
        out.push_str(&format!("{}: {}\n", header.name, header.value));
    }
    if let Some(body) = &request.body {
        out.push('\n');
        match body {
            RequestBody::Regular { text } => out.push_str(text),
            RequestBody::Form {
                encoding: FormEncoding::UrlEncoded,
                records,
            } => out.push_str(&encode_form(records).map_err(anyhow::Error::msg)?),
            RequestBody::Form {
                encoding: FormEncoding::Multipart,
                records,
            } => {
                for record in records {
                    out.push_str(&format!("{}={}\n", record.name, record.value));
                }
            }
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    Ok(out)
}
