use std::fs::File;
use std::io::{Read, stdin};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use jsonapi::stream::write_json_value;
use jsonapi::{JsonWriter, Relationship, Resource, ResourceIdentifier, ResourceRelationshipWriter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NamingArg {
    Identity,
    LowerUnderscore,
    LowerDash,
    LowerDot,
    LowerCamel,
    UpperCamel,
    UpperCamelSpaced,
}

impl From<NamingArg> for jsonapi::FieldNaming {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Identity => jsonapi::FieldNaming::Identity,
            NamingArg::LowerUnderscore => jsonapi::FieldNaming::LowerCaseWithUnderscores,
            NamingArg::LowerDash => jsonapi::FieldNaming::LowerCaseWithDashes,
            NamingArg::LowerDot => jsonapi::FieldNaming::LowerCaseWithDots,
            NamingArg::LowerCamel => jsonapi::FieldNaming::LowerCamelCase,
            NamingArg::UpperCamel => jsonapi::FieldNaming::UpperCamelCase,
            NamingArg::UpperCamelSpaced => jsonapi::FieldNaming::UpperCamelCaseWithSpaces,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "jsonapi-cli",
    about = "Encode resources as JSON:API v1 documents",
    version
)]
struct Args {
    /// Encode the built-in store product instead of reading input
    #[arg(long)]
    demo: bool,

    /// Pretty-print the document
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Indentation width for --pretty
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Naming convention for struct attribute fields
    #[arg(long, value_enum, default_value_t = NamingArg::LowerUnderscore)]
    naming: NamingArg,

    /// Check a relationship object against the JSON:API grammar and echo it
    #[arg(long)]
    validate_relationship: bool,

    /// Input file with a resource object (`type`, `id`, attributes); defaults to stdin
    input: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Store {
    id: u32,
    name: String,
    description: String,
    retailer_id: u32,
}

impl Resource for Store {
    fn id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreProduct {
    id: u32,
    product_id: u32,
    #[serde(serialize_with = "jsonapi::nested")]
    store: Store,
    store_sku: String,
    title: String,
    short_description: String,
    long_description: String,
}

impl Resource for StoreProduct {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn relationships(&self) -> Vec<(String, Relationship)> {
        vec![(
            "store".to_string(),
            Relationship::to_one(ResourceIdentifier::of(&self.store)),
        )]
    }
}

fn demo_product() -> StoreProduct {
    StoreProduct {
        id: 3514512,
        product_id: 10,
        store: Store {
            id: 10,
            name: "P&C Fresh".into(),
            description: "The best selection".into(),
            retailer_id: 4,
        },
        store_sku: "00013000001243".into(),
        title: "Heinz Tomato Ketchup".into(),
        short_description: "Heinz Tomato Ketchup".into(),
        long_description: "Heinz Tomato Ketchup. Established in 1869. 57 varieties. Grown not made."
            .into(),
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    let mut buf = String::new();
    match path {
        Some(path) => {
            let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            f.read_to_string(&mut buf)?;
        }
        None => {
            stdin().read_to_string(&mut buf)?;
        }
    }
    Ok(buf)
}

fn validate_relationship(input: &str, options: &jsonapi::Options) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let mut w = ResourceRelationshipWriter::new(JsonWriter::with_options(Vec::new(), options));
    write_json_value(&mut w, &value).context("invalid relationship object")?;
    let mut json = w.into_inner();
    json.finish()?;
    Ok(String::from_utf8(json.into_inner())?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let options = jsonapi::Options {
        pretty: args.pretty,
        indent: args.indent,
        field_naming: args.naming.into(),
        ..jsonapi::Options::default()
    };

    let out = if args.demo {
        jsonapi::encode_to_string(&demo_product(), &options)?
    } else {
        let buf = read_input(args.input.as_ref())?;
        if args.validate_relationship {
            validate_relationship(&buf, &options)?
        } else {
            let value: serde_json::Value = serde_json::from_str(&buf)?;
            let resource = jsonapi::JsonResource::from_value(value)?;
            jsonapi::encode_to_string(&resource, &options)?
        }
    };
    println!("{}", out);

    Ok(())
}
