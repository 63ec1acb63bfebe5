// Usage the way in-process callers consume the map: build from parallel
// sequences parsed elsewhere, query, then iterate to accumulate a result.
use chainmap::{ChainedMap, Error};

/// Scores a message against phrase weights, counting non-overlapping matches.
fn score(weights: &ChainedMap<String, u32>, message: &str) -> u32 {
    let message = message.to_lowercase().replace('\n', " ");
    weights
        .iter()
        .map(|(phrase, weight)| {
            let hits = u32::try_from(message.matches(&phrase.to_lowercase()).count()).unwrap_or(0);
            hits * weight
        })
        .sum()
}

fn parse_database(csv: &str) -> (Vec<String>, Vec<u32>) {
    csv.lines()
        .filter_map(|line| line.split_once(','))
        .filter_map(|(phrase, weight)| Some((phrase.to_string(), weight.trim().parse::<u32>().ok()?)))
        .unzip()
}

#[test]
fn scores_message_from_parallel_sequences() -> Result<(), Error> {
    let (phrases, weights) = parse_database("free money,5\nact now,3\nFREE MONEY,7\nwinner,10\n");
    let map = ChainedMap::from_parallel(phrases, weights)?;

    assert_eq!(map.len(), 4);
    assert_eq!(map.at("free money")?, &5);
    assert_eq!(map.at("FREE MONEY")?, &7);

    let message = "Act now!\nYou are a WINNER of free money";
    // "act now" 3 + "winner" 10 + "free money" matched by both phrasings 5 + 7
    assert_eq!(score(&map, message), 25);
    Ok(())
}

#[test]
fn mismatched_columns_are_rejected() {
    let phrases = vec!["a".to_string(), "b".to_string()];
    let weights = vec![1_u32];
    assert_eq!(
        ChainedMap::from_parallel(phrases, weights),
        Err(Error::InvalidArgument { keys: 2, values: 1 })
    );
}

#[test]
fn counting_with_default_insertion() {
    let text = "the quick brown fox jumps over the lazy dog the end";
    let mut counts: ChainedMap<&str, usize> = ChainedMap::new();
    for word in text.split_whitespace() {
        *counts.get_or_insert_default(word) += 1;
    }

    assert_eq!(counts.get("the"), Some(&3));
    assert_eq!(counts.get("fox"), Some(&1));
    assert_eq!(counts.len(), 9);
    assert_eq!(counts.values().sum::<usize>(), 11);
}
