//! Report assembly: zip source items with their claims and verdicts.

use crate::error::AlignmentError;
use crate::types::{Claim, Report, ReportEntry, Tweet, Verification};

/// Build one report per source item.
///
/// All three inputs must have one entry per item, and each item's claim
/// list must match its verdict block. Nothing is assembled on mismatch.
pub fn assemble(
    items: &[Tweet],
    claim_lists: &[Vec<Claim>],
    verification_blocks: Vec<Vec<Verification>>,
) -> Result<Vec<Report>, AlignmentError> {
    if claim_lists.len() != items.len() {
        return Err(AlignmentError::ItemCount {
            what: "claim lists",
            expected: items.len(),
            actual: claim_lists.len(),
        });
    }
    if verification_blocks.len() != items.len() {
        return Err(AlignmentError::ItemCount {
            what: "verification blocks",
            expected: items.len(),
            actual: verification_blocks.len(),
        });
    }
    if let Some((index, (claims, block))) = claim_lists
        .iter()
        .zip(&verification_blocks)
        .enumerate()
        .find(|(_, (claims, block))| claims.len() != block.len())
    {
        return Err(AlignmentError::ClaimCount {
            index,
            claims: claims.len(),
            verifications: block.len(),
        });
    }

    Ok(items
        .iter()
        .zip(claim_lists)
        .zip(verification_blocks)
        .map(|((item, claims), block)| Report {
            source_item: item.clone(),
            claims: claims
                .iter()
                .cloned()
                .zip(block)
                .map(|(claim, verification)| ReportEntry {
                    claim,
                    verification,
                })
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtractedClaims, TruthScore};

    fn verdict(claim: &str) -> Verification {
        Verification::new(claim, TruthScore::Medium, "", Vec::new())
    }

    #[test]
    fn test_assemble_counts_zero_two_one() {
        let items = vec![Tweet::new("t0"), Tweet::new("t1"), Tweet::new("t2")];
        let extracted = ExtractedClaims::from_texts(vec![
            vec![],
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ]);
        let blocks = vec![vec![], vec![verdict("a"), verdict("b")], vec![verdict("c")]];

        let reports = assemble(&items, extracted.claim_lists(), blocks).unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(
            reports.iter().map(|r| r.claims.len()).collect::<Vec<_>>(),
            vec![0, 2, 1]
        );
        assert_eq!(reports[1].source_item.text(), "t1");
        assert_eq!(reports[1].claims[1].claim.text, "b");
        assert_eq!(reports[1].claims[1].verification.claim_text, "b");
        assert_eq!(reports[2].claims[0].claim.source_item_index, 2);
    }

    #[test]
    fn test_assemble_rejects_outer_mismatch() {
        let items = vec![Tweet::new("t0"), Tweet::new("t1")];
        let lists = vec![vec![], vec![]];
        assert_eq!(
            assemble(&items, &lists, vec![vec![]]),
            Err(AlignmentError::ItemCount {
                what: "verification blocks",
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_assemble_rejects_per_item_mismatch() {
        let items = vec![Tweet::new("t0")];
        let lists = vec![vec![Claim::new("a", 0)]];
        assert_eq!(
            assemble(&items, &lists, vec![vec![verdict("a"), verdict("extra")]]),
            Err(AlignmentError::ClaimCount {
                index: 0,
                claims: 1,
                verifications: 2
            })
        );
    }

    #[test]
    fn test_assemble_empty() {
        assert!(assemble(&[], &[], Vec::new()).unwrap().is_empty());
    }
}
