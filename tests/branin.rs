use adasg::algorithm::global::GlobalStrategy;
use adasg::basis::closed::ClosedBasis;
use adasg::config::Config;
use adasg::errors::AdaptError;
use adasg::grids::closed::ClosedGrid;
use adasg::interpolator::{Interpolator, Target};
use adasg::surrogate::Surrogate;

/// Branin over [0, 1]^2, rescaled from its usual domain.
struct Branin;

impl Target for Branin
{
    fn dimensions(&self) -> (usize, usize)
    {
        (2, 1)
    }

    fn compute(&self, point: &[f64], value: &mut [f64]) -> Result<(), AdaptError>
    {
        use std::f64::consts::PI;
        let (x, y) = (15.0 * point[0] - 5.0, 15.0 * point[1]);
        let z = 5.0 / PI * x - 5.1 / (4.0 * PI * PI) * x * x + y - 6.0;
        value[0] = z * z + 10.0 * (1.0 - 1.0 / (8.0 * PI)) * x.cos() + 10.0;
        Ok(())
    }
}

// Branin on the 11 x 11 grid {0, 0.1, ..., 1}^2, the second coordinate
// varying fastest.
const FIXTURE_VALUES: [f64; 121] = [
    3.0812909601160663e+02,
    2.5881701636202388e+02,
    2.1400493671244101e+02,
    1.7369285706285817e+02,
    1.3788077741327527e+02,
    1.0656869776369244e+02,
    7.9756618114109585e+01,
    5.7444538464526737e+01,
    3.9632458814943881e+01,
    2.6320379165361025e+01,
    1.7508299515778170e+01,
    1.7400769035750577e+02,
    1.3679889062181547e+02,
    1.0409009088612515e+02,
    7.5881291150434848e+01,
    5.2172491414744542e+01,
    3.2963691679054236e+01,
    1.8254891943363937e+01,
    8.0460922076736310e+00,
    2.3372924719833277e+00,
    1.1284927362930244e+00,
    4.4196930006027211e+00,
    1.0009094705558034e+02,
    7.3241436360338838e+01,
    5.0891925665097354e+01,
    3.3042414969855869e+01,
    1.9692904274614378e+01,
    1.0843393579372886e+01,
    6.4938828841313967e+00,
    6.6443721888899070e+00,
    1.1294861493648417e+01,
    2.0445350798406928e+01,
    3.4095840103165436e+01,
    6.5049198045714334e+01,
    4.6814985517477922e+01,
    3.3080772989241503e+01,
    2.3846560461005087e+01,
    1.9112347932768671e+01,
    1.8878135404532252e+01,
    2.3143922876295839e+01,
    3.1909710348059420e+01,
    4.5175497819823008e+01,
    6.2941285291586588e+01,
    8.5207072763350169e+01,
    3.5778175704962486e+01,
    2.4415270470287407e+01,
    1.7552365235612324e+01,
    1.5189460000937242e+01,
    1.7326554766262163e+01,
    2.3963649531587087e+01,
    3.5100744296912005e+01,
    5.0737839062236930e+01,
    7.0874933827561847e+01,
    9.5512028592886764e+01,
    1.2464912335821168e+02,
    1.0307908486409694e+01,
    4.0723196718522079e+00,
    2.3367308572947225e+00,
    5.1011420427372389e+00,
    1.2365553228179754e+01,
    2.4129964413622268e+01,
    4.0394375599064787e+01,
    6.1158786784507299e+01,
    8.6423197969949811e+01,
    1.1618760915539234e+02,
    1.5045202034083485e+02,
    6.6162059306544840e+00,
    3.7639426627708543e+00,
    5.4116793948872246e+00,
    1.1559416127003590e+01,
    2.2207152859119958e+01,
    3.7354889591236329e+01,
    5.7002626323352693e+01,
    8.1150363055469057e+01,
    1.0979809978758543e+02,
    1.4294583651970177e+02,
    1.8059357325181816e+02,
    1.8137157493546802e+01,
    1.6924228898893290e+01,
    2.0211300304239778e+01,
    2.7998371709586266e+01,
    4.0285443114932754e+01,
    5.7072514520279242e+01,
    7.8359585925625737e+01,
    1.0414665733097222e+02,
    1.3443372873631870e+02,
    1.6922080014166519e+02,
    2.0850787154701169e+02,
    1.8653238952862246e+01,
    1.7335654157995116e+01,
    2.0518069363127985e+01,
    2.8200484568260848e+01,
    4.0382899773393710e+01,
    5.7065314978526580e+01,
    7.8247730183659442e+01,
    1.0393014538879231e+02,
    1.3411256059392520e+02,
    1.6879497579905802e+02,
    2.0797739100419091e+02,
    7.4789214155018051e+00,
    4.3126895469773121e+00,
    5.6464576784528191e+00,
    1.1480225809928326e+01,
    2.1813993941403833e+01,
    3.6647762072879345e+01,
    5.5981530204354847e+01,
    7.9815298335830349e+01,
    1.0814906646730581e+02,
    1.4098283459878132e+02,
    1.7831660273025685e+02,
    1.0960889035651505e+01,
    4.2020192200259103e+00,
    1.9431494044003159e+00,
    4.1842795887747215e+00,
    1.0925409773149127e+01,
    2.2166539957523533e+01,
    3.7907670141897938e+01,
    5.8148800326272344e+01,
    8.2889930510646749e+01,
    1.1213106069502115e+02,
    1.4587219087939556e+02,
];

fn config(workers: usize) -> Config
{
    Config {
        min_level: 1,
        max_level: 10,
        absolute_error: 1e-6,
        relative_error: 1e-3,
        workers,
        ..Config::default()
    }
}

fn construct(workers: usize) -> Surrogate
{
    let config = config(workers);
    let grid = ClosedGrid::new(2);
    let basis = ClosedBasis::new(2, 1);
    let interpolator = Interpolator::new(grid, basis, &config).unwrap();
    let mut strategy = GlobalStrategy::new(2, 1, grid, &config);
    interpolator.compute(&Branin, &mut strategy).unwrap()
}

fn grid_points() -> Vec<f64>
{
    let mut points = Vec::with_capacity(11 * 11 * 2);
    for i in 0..11
    {
        for j in 0..11
        {
            points.push(i as f64 / 10.0);
            points.push(j as f64 / 10.0);
        }
    }
    points
}

#[test]
fn check_branin_convergence()
{
    let config = config(0);
    let grid = ClosedGrid::new(2);
    let basis = ClosedBasis::new(2, 1);
    let interpolator = Interpolator::new(grid, basis, &config).unwrap();
    let mut strategy = GlobalStrategy::new(2, 1, grid, &config);
    let surrogate = interpolator.compute(&Branin, &mut strategy).unwrap();

    assert_eq!(surrogate.nodes(), 377);

    let points = grid_points();
    let approximated = interpolator.evaluate(&surrogate, &points);

    let upper = FIXTURE_VALUES.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let lower = FIXTURE_VALUES.iter().cloned().fold(f64::INFINITY, f64::min);
    let delta = 1e-3 * (upper - lower) + 1e-6;

    for ((point, &have), &want) in points.chunks_exact(2).zip(&approximated).zip(&FIXTURE_VALUES)
    {
        assert!(
            (have - want).abs() <= delta,
            "at {point:?}: have {have}, want {want}, delta {delta}"
        );
    }
}

#[test]
fn check_worker_count_does_not_change_the_surrogate()
{
    let reference = construct(1);
    for workers in [2, 8]
    {
        let surrogate = construct(workers);
        assert_eq!(surrogate.nodes(), reference.nodes(), "workers {workers}");
        assert_eq!(surrogate.indices(), reference.indices(), "workers {workers}");
        assert_eq!(surrogate.surpluses(), reference.surpluses(), "workers {workers}");
    }
}

#[test]
fn check_surrogate_shape()
{
    let surrogate = construct(0);
    assert!(surrogate.nodes() > 0);
    assert_eq!(surrogate.indices().len(), surrogate.nodes() * surrogate.inputs());
    assert_eq!(surrogate.surpluses().len(), surrogate.nodes() * surrogate.outputs());
}
