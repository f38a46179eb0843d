use std::io::{self, Write};

use rand::Rng;

use crate::generator::Generator;

pub fn write_lines<W: Write, R: Rng>(
    out: &mut W,
    generator: &mut Generator<R>,
    count: u64,
) -> io::Result<()> {
    for _ in 0..count {
        writeln!(out, "{}", generator.next_line())?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn writes_one_line_per_record() {
        let mut generator = Generator::new(StdRng::seed_from_u64(3), 728_475, 2, 0.0);
        let mut out = Vec::new();
        write_lines(&mut out, &mut generator, 25).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_that!(text.lines().count()).is_equal_to(25);
        assert_that!(text.ends_with('\n')).is_true();
    }
}
