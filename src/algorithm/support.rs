use crate::index::LevelOrder;

pub fn average(data: &[f64]) -> f64
{
    if data.is_empty()
    {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

pub fn sum_absolute(data: &[f64]) -> f64
{
    data.iter().map(|value| value.abs()).sum()
}

pub fn subtract(minuend: &[f64], subtrahend: &[f64]) -> Vec<f64>
{
    minuend.iter().zip(subtrahend).map(|(a, b)| a - b).collect()
}

/// Level sum of each level index in a flat sequence.
pub fn levelize(lindices: &[LevelOrder], ni: usize) -> Vec<u64>
{
    lindices
        .chunks_exact(ni)
        .map(|lindex| lindex.iter().map(|word| word.level() as u64).sum())
        .collect()
}

#[test]
fn check_helpers()
{
    assert_eq!(average(&[1.0, 2.0, 6.0]), 3.0);
    assert_eq!(sum_absolute(&[-1.0, 2.0, -3.0]), 6.0);
    assert_eq!(subtract(&[3.0, 1.0], &[1.0, 4.0]), vec![2.0, -3.0]);

    let lindices = [
        LevelOrder::ROOT, LevelOrder::from_parts(2, 0),
        LevelOrder::from_parts(1, 0), LevelOrder::from_parts(3, 0),
    ];
    assert_eq!(levelize(&lindices, 2), vec![2, 4]);
}
