#![cfg(test)]

/// Generates a random value in the given range.
pub fn gen_range<T, R>(range: R) -> T
where
    T: rand::distributions::uniform::SampleUniform,
    R: rand::distributions::uniform::SampleRange<T>,
{
    use rand::Rng;
    rand::thread_rng().gen_range(range)
}
