// The rule set shipped in config.toml, checked against real-looking titles.

use deal_watch::config::Config;
use deal_watch::feed::types::Item;
use deal_watch::filter::{RuleSet, Verdict};
use std::path::Path;

fn shipped_rules() -> RuleSet {
    let config = Config::load(Path::new("config.toml")).unwrap();
    RuleSet::new(&config.feed.subreddit, &config.filter)
}

fn post(title: &str, domain: &str) -> Item {
    Item {
        id: "abc123".into(),
        title: title.into(),
        url: "https://example.com/deal".into(),
        domain: domain.into(),
        permalink: "https://www.reddit.com/r/GameDeals/comments/abc123/".into(),
    }
}

#[test]
fn test_free_steam_game_matches() {
    let rules = shipped_rules();
    assert!(rules.matches(&post("[Steam] Portal (100% off)", "store.steampowered.com")));
    assert!(rules.matches(&post("[Epic Games] Control (Free)", "store.epicgames.com")));
    assert!(rules.matches(&post("[GOG] Beneath a Steel Sky (FREE/100% off)", "gog.com")));
}

#[test]
fn test_promotions_are_excluded() {
    let rules = shipped_rules();
    for title in [
        "[Steam] Some Shooter Free Weekend",
        "[Steam] MMO (Free to Play) - bonus pack",
        "[Epic] Racing Game free trial",
        "[GOG] Buy 2 get 1 free",
        "[Steam] Limited Time: Strategy Game (Free)",
    ] {
        assert!(
            matches!(rules.evaluate(&post(title, "store.example.com")), Verdict::Excluded(_)),
            "{} should be excluded",
            title
        );
    }
}

#[test]
fn test_discount_without_free_does_not_match() {
    let rules = shipped_rules();
    let verdict = rules.evaluate(&post("[Steam] Big RPG (-80%)", "store.steampowered.com"));
    assert_eq!(verdict, Verdict::NoQualifyingTerm);
}

#[test]
fn test_other_storefront_does_not_match() {
    let rules = shipped_rules();
    let verdict = rules.evaluate(&post("[Humble Bundle] Puzzle Pack (100% off)", "humblebundle.com"));
    assert_eq!(verdict, Verdict::NoAllowedTerm);
}

#[test]
fn test_self_post_never_matches() {
    let rules = shipped_rules();
    let verdict = rules.evaluate(&post("[Steam] Free games megathread (100%)", "self.GameDeals"));
    assert_eq!(verdict, Verdict::SelfPost);
}
