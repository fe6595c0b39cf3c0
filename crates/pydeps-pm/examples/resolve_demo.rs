use pydeps_pm::{merge_specs, InMemoryIndex, Resolver};
use pydeps_semver::Version;

#[tokio::main]
async fn main() -> pydeps_pm::Result<()> {
    println!("Dependency Walk Demo\n");

    let index = InMemoryIndex::from_json(
        r#"{
            "flask-0.9": ["Werkzeug>=0.7", "Jinja2>=2.4"],
            "werkzeug-0.8.3": [],
            "jinja2-2.6": ["MarkupSafe"],
            "jinja2-2.7": ["MarkupSafe>=0.9"],
            "markupsafe-0.18": []
        }"#,
    )?;
    println!("Index holds {} packages\n", index.len());

    let specs = Resolver::new(&index)
        .resolve_package("flask", &Version::parse("0.9")?)
        .await?;

    println!("1. Raw walk:");
    for spec in &specs {
        println!("   {:<20} (from {})", spec.to_string(), spec.source().unwrap_or("-"));
    }
    println!();

    println!("2. Merged:");
    for merged in merge_specs(&specs) {
        println!("   {:<20} <- {}", merged.spec.to_string(), merged.sources.join(", "));
    }

    Ok(())
}
