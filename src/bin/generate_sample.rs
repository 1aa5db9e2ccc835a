//! Writes a synthetic review dataset in the extended (Amazon fine-food) layout.
//!
//! usage: generate_sample [rows] [out.csv]

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

static PRODUCTS: [&str; 10] = [
    "B001E4KFG0", "B00813GRG4", "B000LQOCH0", "B006K2ZZ7K", "B002QWP89S",
    "B007WTAJTO", "B001MA0QY2", "B008F4SU0Y", "B003D4F1QS", "B000HDOPZG",
];

static POSITIVE_TEXTS: [&str; 5] = [
    "This product is absolutely amazing! I love everything about it. The quality is outstanding and it works perfectly. Highly recommend to anyone looking for a great product.",
    "Excellent quality and fast shipping. The product exceeded my expectations. Will definitely buy again!",
    "Perfect! Exactly what I was looking for. Great value for money and excellent customer service.",
    "Outstanding product! The quality is top-notch and it arrived quickly. Very satisfied with this purchase.",
    "Love this product! It's exactly as described and works great. Would definitely recommend to others.",
];

static NEGATIVE_TEXTS: [&str; 5] = [
    "Terrible product. Poor quality and doesn't work as advertised. Waste of money. Would not recommend to anyone.",
    "Very disappointed with this purchase. The product broke after just a few days. Poor quality and bad customer service.",
    "Awful experience. Product doesn't work at all. Waste of time and money. Avoid this seller.",
    "Poor quality product. Not worth the money. Would not buy again or recommend to others.",
    "Disappointed with this purchase. The product is not as described and the quality is very poor.",
];

static NEUTRAL_TEXTS: [&str; 5] = [
    "The product is okay. It works as expected but nothing special. Average quality for the price.",
    "Decent product. Does what it's supposed to do but could be better. Average experience overall.",
    "It's fine. The product works but I expected better quality. Not bad but not great either.",
    "Average product. It works but there are better options available. Okay for the price.",
    "The product is acceptable. It does its job but nothing extraordinary. Middle of the road quality.",
];

static POSITIVE_SUMMARIES: [&str; 5] = ["Great product!", "Excellent quality", "Highly recommend", "Perfect!", "Love it!"];
static NEGATIVE_SUMMARIES: [&str; 5] = ["Terrible quality", "Waste of money", "Poor product", "Don't buy", "Very disappointed"];
static NEUTRAL_SUMMARIES: [&str; 5] = ["It's okay", "Average product", "Decent quality", "Not bad", "Acceptable"];

const SPREAD_DAYS: i64 = 180;

/// 4-5 stars read positive, 1-2 negative, 3 neutral.
fn pools(score: u8) -> (&'static [&'static str], &'static [&'static str]) {
    match score {
        4..=5 => (&POSITIVE_TEXTS[..], &POSITIVE_SUMMARIES[..]),
        0..=2 => (&NEGATIVE_TEXTS[..], &NEGATIVE_SUMMARIES[..]),
        _ => (&NEUTRAL_TEXTS[..], &NEUTRAL_SUMMARIES[..]),
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let rows: usize = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid row count: {}", raw))?,
        None => 10_000,
    };
    let out = args.next().unwrap_or_else(|| "amazon_reviews.csv".to_string());

    let mut rng = rand::thread_rng();
    let mut writer = csv::Writer::from_path(&out).with_context(|| format!("creating {}", out))?;
    writer.write_record([
        "Id", "ProductId", "UserId", "ProfileName", "HelpfulnessNumerator",
        "HelpfulnessDenominator", "Score", "Time", "Summary", "Text",
    ])?;

    let now = Utc::now();
    for i in 1..=rows {
        let score: u8 = rng.gen_range(1..=5);
        let days_ago = rng.gen_range(0..SPREAD_DAYS);
        let time = (now - Duration::days(days_ago)).timestamp();
        let (texts, summaries) = pools(score);
        let user: String = (0..9)
            .map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
            .collect::<String>()
            .to_uppercase();

        writer.write_record([
            i.to_string(),
            PRODUCTS.choose(&mut rng).copied().unwrap_or(PRODUCTS[0]).to_string(),
            format!("A{}", user),
            format!("User{}", i),
            rng.gen_range(0..20).to_string(),
            rng.gen_range(5..30).to_string(),
            score.to_string(),
            time.to_string(),
            summaries.choose(&mut rng).copied().unwrap_or_default().to_string(),
            texts.choose(&mut rng).copied().unwrap_or_default().to_string(),
        ])?;
    }
    writer.flush()?;

    let size = std::fs::metadata(&out)?.len();
    println!(
        "Sample dataset created at: {} ({} rows, {:.2} MB)",
        out,
        rows,
        size as f64 / 1024.0 / 1024.0
    );
    Ok(())
}
