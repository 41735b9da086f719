//! `topics` subcommand: print the shadow topics for the configured thing.

use std::path::Path;

use super::{Result, ShadowTopics, TopicsOutput};

pub(super) fn cmd_topics(json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    let topics = ShadowTopics::new(&config.thing_name);

    if json {
        let output = TopicsOutput {
            thing_name: config.thing_name.clone(),
            subscribe: topics
                .subscriptions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            publish: vec![topics.get.clone(), topics.update.clone()],
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    println!("Shadow topics for {}:", config.thing_name);
    println!();
    println!("Subscribe:");
    for t in topics.subscriptions() {
        println!("  {t}");
    }
    println!();
    println!("Publish:");
    println!("  {}", topics.get);
    println!("  {}", topics.update);
    Ok(())
}
