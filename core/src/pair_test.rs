#[cfg(test)]
mod tests {
    use crate::pair::*;

    #[test]
    fn test_transform_regression_fixture() {
        let p = transform(0x1234_5678, 0x9abc_def0);
        assert_eq!(p.a, 0x8097_E2F9);
        assert_eq!(p.b, 0x3016_8BA5);
    }

    #[test]
    fn test_transform_wraps_edge_values() {
        assert_eq!(transform(0, 0), Pair::new(0, B_MASK));
        assert_eq!(transform(u32::MAX, 0), Pair::new(u32::MAX, B_MASK));
        // top bit rotates into bit 6
        assert_eq!(transform(0x8000_0000, 0).a, 0x40);
        assert_eq!(transform(1, B_MASK), Pair::new(0x80 ^ B_MASK, 0));
    }

    #[test]
    fn test_seed_rotates_upper_half() {
        let acc = Accumulator::seed(0x1234_5678);
        assert_eq!(acc.ra, 0x1234_5678);
        assert_eq!(acc.rb, 0x5678_1234);
    }

    #[test]
    fn test_fold_crosses_halves() {
        let mut acc = Accumulator { ra: 0xF0F0_0000, rb: 0x0000_0F0F };
        acc.fold(Pair::new(0x0000_000F, 0x000F_0000));
        assert_eq!(acc.ra, 0xF0FF_0000);
        assert_eq!(acc.rb, 0x0000_0F00);
        assert_eq!(acc.finish(), 0xF0FF_0F00);
    }

    #[test]
    fn test_reference_chain_zero_iterations_is_seed() {
        let input = 0xDEAD_BEEF;
        let seed = Accumulator::seed(input);
        assert_eq!(reference_chain(0, input), seed.finish());
    }

    #[test]
    fn test_reference_chain_one_step() {
        let input = 0x1234_5678;
        let mut acc = Accumulator::seed(input);
        let p = transform(acc.ra, acc.rb);
        acc.fold(p);
        assert_eq!(reference_chain(1, input), acc.finish());
    }
}
