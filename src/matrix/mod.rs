//! About the random arrays used to seed and perturb the system.

use ndarray::Array1;
use ndarray_rand::RandomExt;
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{StandardNormal, Uniform};





/// Draw n components independently and uniformly from [low, high)
pub fn rand_uniform<R: Rng + ?Sized>(n: usize, low: f64, high: f64, rng: &mut R) -> Array1<f64>
{
    Array1::random_using(n, Uniform::new(low, high), rng)
}



/// Draw n independent standard normal components
pub fn rand_normal<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Array1<f64>
{
    Array1::random_using(n, StandardNormal, rng)
}



/// Squared Euclidean norm of an array
pub fn norm_sq(x: &Array1<f64>) -> f64
{
    x.dot(x)
}
