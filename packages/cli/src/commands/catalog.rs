use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagewright_registry::{catalog as standard, FieldDescriptor, SectionRegistry};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only list this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry<'a> {
    #[serde(rename = "type")]
    pub section_type: &'a str,
    pub display_name: &'a str,
    pub group: &'a str,
    pub placeholder: &'a str,
    pub content_fields: &'a [FieldDescriptor],
    pub style_fields: &'a [FieldDescriptor],
}

pub fn entries<'a>(registry: &'a SectionRegistry, group: Option<&str>) -> Vec<CatalogEntry<'a>> {
    registry
        .list_all()
        .iter()
        .filter(|d| group.map_or(true, |g| d.group.eq_ignore_ascii_case(g)))
        .map(|d| CatalogEntry {
            section_type: d.section_type.as_str(),
            display_name: &d.display_name,
            group: &d.group,
            placeholder: &d.placeholder,
            content_fields: &d.schema.content_fields,
            style_fields: &d.schema.style_fields,
        })
        .collect()
}

pub fn catalog(args: CatalogArgs) -> Result<()> {
    let registry = standard::standard();
    let listed = entries(&registry, args.group.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if listed.is_empty() {
        if let Some(group) = &args.group {
            anyhow::bail!(
                "no group named {:?}; groups are: {}",
                group,
                registry.groups().join(", ")
            );
        }
    }

    for group in registry.groups() {
        let in_group: Vec<_> = listed.iter().filter(|e| e.group == group).collect();
        if in_group.is_empty() {
            continue;
        }

        println!("{}", group.bright_blue().bold());
        for entry in in_group {
            let fields: Vec<&str> = entry
                .content_fields
                .iter()
                .chain(entry.style_fields)
                .map(|f| f.id.as_str())
                .collect();
            println!(
                "  {} {} {}",
                entry.section_type.green(),
                entry.display_name,
                format!("({})", fields.join(", ")).dimmed()
            );
        }
        println!();
    }

    println!("{} section types", registry.len());
    Ok(())
}
