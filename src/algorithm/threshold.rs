use crate::algorithm::tracker::ActiveSet;

///
/// Per-output stopping rule. Tracks the running range of observed output
/// values and accepts an error table once every active row is within
/// max(relative * range, absolute) in each output.
///
pub struct Threshold
{
    outputs: usize,
    absolute: f64,
    relative: f64,
    lower: Vec<f64>,
    upper: Vec<f64>,
    seen: bool,
}

impl Threshold
{
    pub fn new(outputs: usize, absolute: f64, relative: f64) -> Self
    {
        Self {
            outputs,
            absolute,
            relative,
            lower: vec![f64::INFINITY; outputs],
            upper: vec![f64::NEG_INFINITY; outputs],
            seen: false,
        }
    }

    /// Extend the running range with a batch of observed values.
    pub fn update(&mut self, values: &[f64])
    {
        for value in values.chunks_exact(self.outputs)
        {
            for (o, &v) in value.iter().enumerate()
            {
                self.lower[o] = self.lower[o].min(v);
                self.upper[o] = self.upper[o].max(v);
            }
            self.seen = true;
        }
    }

    /// Fold a block of surpluses into a per-output error row.
    pub fn compress(&self, accuracy: &mut [f64], surpluses: &[f64])
    {
        for surplus in surpluses.chunks_exact(self.outputs)
        {
            for (o, &s) in surplus.iter().enumerate()
            {
                accuracy[o] = accuracy[o].max(s.abs());
            }
        }
    }

    /// True once every active row of the error table is within tolerance.
    pub fn check(&self, accuracy: &[f64], active: &ActiveSet) -> bool
    {
        if !self.seen
        {
            return false;
        }
        let no = self.outputs;
        let delta: Vec<f64> = (0..no)
            .map(|o| (self.relative * (self.upper[o] - self.lower[o])).max(self.absolute))
            .collect();
        for &i in active
        {
            for o in 0..no
            {
                if accuracy[i * no + o] > delta[o]
                {
                    return false;
                }
            }
        }
        true
    }
}

#[test]
fn check_threshold()
{
    let mut active = ActiveSet::default();
    active.insert(0);
    active.insert(1);

    let mut threshold = Threshold::new(1, 1e-2, 1e-1);
    assert!(!threshold.check(&[0.0, 0.0], &active));

    threshold.update(&[0.0, 10.0]);
    // delta = max(1e-1 * 10, 1e-2) = 1.0
    assert!(threshold.check(&[0.5, 0.9], &active));
    assert!(!threshold.check(&[0.5, 1.5], &active));

    // Only active rows count.
    active.shift_remove(&1);
    assert!(threshold.check(&[0.5, 1.5], &active));
}

#[test]
fn check_compress()
{
    let threshold = Threshold::new(2, 0.0, 0.0);
    let mut accuracy = [0.0, 0.0];
    threshold.compress(&mut accuracy, &[1.0, -2.0, -3.0, 0.5]);
    assert_eq!(accuracy, [3.0, 2.0]);
}
