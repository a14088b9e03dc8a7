use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AucError {
    #[error("y_true and y_score have different lengths ({0} != {1})")]
    LengthMismatch(usize, usize),

    #[error("Only one class present in y_true. ROC AUC score is not defined in that case.")]
    SingleClass,

    #[error("Input contains NaN or infinity (score at index {0}).")]
    NonFinite(usize),
}

/// Area under the ROC curve for binary labels, ties counted as half.
///
/// Computed from the Mann-Whitney U statistic over average ranks.
pub fn roc_auc_score(y_true: &[bool], y_score: &[f64]) -> Result<f64, AucError> {
    if y_true.len() != y_score.len() {
        return Err(AucError::LengthMismatch(y_true.len(), y_score.len()));
    }
    if let Some(idx) = y_score.iter().position(|s| !s.is_finite()) {
        return Err(AucError::NonFinite(idx));
    }
    let positives = y_true.iter().filter(|t| **t).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(AucError::SingleClass);
    }

    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|a, b| y_score[*a].total_cmp(&y_score[*b]));

    let mut rank_sum_pos = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && y_score[order[end]] == y_score[order[start]] {
            end += 1;
        }
        // ranks are 1-based; tied block shares the mean rank
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for idx in &order[start..end] {
            if y_true[*idx] {
                rank_sum_pos += avg_rank;
            }
        }
        start = end;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Ok((rank_sum_pos - p * (p + 1.0) / 2.0) / (p * n))
}
