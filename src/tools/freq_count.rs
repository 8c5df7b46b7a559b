/// Symbol frequency counts for one compression session.
///
/// Counts are kept in a 256 entry array indexed by byte value, so iterating the table always
/// visits symbols in ascending order. Symbols with a zero count are not part of the alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreqTable {
    counts: [u64; 256],
}

impl FreqTable {
    pub fn new() -> Self {
        Self { counts: [0; 256] }
    }

    /// Add the symbols in data to the counts.
    pub fn add(&mut self, data: &[u8]) {
        data.iter().for_each(|&el| self.counts[el as usize] += 1);
    }

    /// Set the count for one symbol directly.
    pub fn set(&mut self, symbol: u8, count: u64) {
        self.counts[symbol as usize] = count;
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Number of distinct symbols seen.
    pub fn alphabet_size(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterate (symbol, count) over the alphabet in ascending symbol order.
    pub fn symbols(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(sym, &c)| (sym as u8, c))
    }
}

impl Default for FreqTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a frequency count of the input data.
pub fn freqs(data: &[u8]) -> FreqTable {
    let mut table = FreqTable::new();
    table.add(data);
    table
}

#[cfg(test)]
mod test {
    use super::freqs;

    #[test]
    fn hello_world_test() {
        let table = freqs(b"Hello World");
        assert_eq!(table.alphabet_size(), 8);
        assert_eq!(table.total(), 11);
        assert_eq!(table.count(b'l'), 3);
        assert_eq!(table.count(b'o'), 2);
        assert_eq!(table.count(b'z'), 0);
        let syms = table.symbols().map(|(s, _)| s).collect::<Vec<u8>>();
        assert_eq!(syms, b" HWdelor".to_vec());
    }

    #[test]
    fn empty_test() {
        let table = freqs(&[]);
        assert_eq!(table.alphabet_size(), 0);
        assert_eq!(table.symbols().count(), 0);
    }

    #[test]
    fn full_alphabet_test() {
        let data = (0..=255).collect::<Vec<u8>>();
        let table = freqs(&data);
        assert_eq!(table.alphabet_size(), 256);
        assert_eq!(table.symbols().last(), Some((255, 1)));
    }
}
