use chrono::{DateTime, Utc};

/// Composite relevance score for the default `recommended` ordering.
///
/// Blends rating, review volume, views and recency:
/// - rating contributes `avg_rating * 20` (0-100 on a 5-star scale);
/// - each review adds 5;
/// - views contribute logarithmically (`ln(views + 1) * 10`), scaled by an
///   age decay so old view counts fade. The log applies to the raw count,
///   not the decayed value, so raw magnitude is what gets compressed;
/// - listings younger than a week get a linear freshness boost of up to 15.
///
/// The decay is 1.0 at age zero, 0.5 at 30 days, floored at 0.1 from day 60.
/// The total is comparative, not normalized; callers only order by it.
pub fn compute_recommended_score(
    avg_rating: f64,
    view_count: i64,
    review_count: i64,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let rating_score = avg_rating * 20.0;
    let review_score = review_count as f64 * 5.0;

    let age_days = (now - created_at).num_days().max(0) as f64;
    let decay_factor = f64::max(0.1, 1.0 - (age_days / 30.0) * 0.5);
    let view_score = ((view_count.max(0) as f64) + 1.0).ln() * 10.0 * decay_factor;

    let freshness_boost = if age_days < 7.0 {
        15.0 * (1.0 - age_days / 7.0)
    } else {
        0.0
    };

    rating_score + review_score + view_score + freshness_boost
}

/// Convenience wrapper scoring against the current clock.
pub fn recommended_score(
    avg_rating: f64,
    view_count: i64,
    review_count: i64,
    created_at: DateTime<Utc>,
) -> f64 {
    compute_recommended_score(avg_rating, view_count, review_count, created_at, Utc::now())
}
