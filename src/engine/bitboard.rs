//! A fixed-size bitboard implementation using const generics.
//!
//! Boards are an `N×N` grid packed into an unsigned integer `T`, addressed by
//! `(x, y)` with `x` the column and `y` the row. Cell `(x, y)` lives at bit
//! `y * N + x`. Besides the per-cell accessors the board supports whole-grid
//! set algebra and [`BitBoard::dilate`], the 8-neighbourhood expansion that
//! the adjacency and sink inference rules are built on.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use core::{any, fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};

/// Errors returned by bitboard operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitBoardError {
    /// Requested board size N*N exceeds capacity of `T::BITS`.
    #[error("SizeTooLarge: N*N={} exceeds T::BITS={capacity}", .n * .n)]
    SizeTooLarge { n: usize, capacity: usize },
    /// Column or row index is out of bounds [0..N).
    #[error("IndexOutOfBounds: x={x}, y={y}")]
    IndexOutOfBounds { x: usize, y: usize },
}

/// A fixed-size N×N bitboard stored in the unsigned integer `T`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitBoard<T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T, const N: usize> BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    /// Number of usable bits in the board (`N * N`).
    const BOARD_BITS: usize = N * N;

    #[inline]
    fn mask() -> T {
        if Self::BOARD_BITS == mem::size_of::<T>() * 8 {
            !T::zero()
        } else {
            (T::one() << Self::BOARD_BITS) - T::one()
        }
    }

    /// Bits of every cell in column `x`.
    fn column(x: usize) -> T {
        (0..N).fold(T::zero(), |acc, y| acc | (T::one() << (y * N + x)))
    }

    /// Create a new empty bitboard (all bits cleared) without size check.
    #[inline]
    pub fn new() -> Self {
        BitBoard { bits: T::zero() }
    }

    /// Fallible constructor: returns `Err(SizeTooLarge)` if N*N > T::BITS.
    pub fn try_new() -> Result<Self, BitBoardError> {
        let capacity = mem::size_of::<T>() * 8;
        if Self::BOARD_BITS > capacity {
            Err(BitBoardError::SizeTooLarge { n: N, capacity })
        } else {
            Ok(BitBoard { bits: T::zero() })
        }
    }

    /// Returns `true` if `(x, y)` addresses a cell of the board.
    #[inline]
    pub fn in_bounds(x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < N && (y as usize) < N
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns true if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    /// Gets the bit at (x, y).
    pub fn get(&self, x: usize, y: usize) -> Result<bool, BitBoardError> {
        self.check_bounds(x, y)?;
        Ok(((self.bits >> (y * N + x)) & T::one()) != T::zero())
    }

    /// Like [`get`](Self::get), but treats off-board cells as clear.
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.get(x, y).unwrap_or(false)
    }

    /// Sets the bit at (x, y) to 1.
    pub fn set(&mut self, x: usize, y: usize) -> Result<(), BitBoardError> {
        self.check_bounds(x, y)?;
        self.bits = self.bits | (T::one() << (y * N + x));
        Ok(())
    }

    /// Clears all bits to `0`.
    #[inline]
    pub fn clear_all(&mut self) {
        self.bits = T::zero();
    }

    #[inline]
    fn check_bounds(&self, x: usize, y: usize) -> Result<(), BitBoardError> {
        if x >= N || y >= N {
            Err(BitBoardError::IndexOutOfBounds { x, y })
        } else {
            Ok(())
        }
    }

    /// Consumes the board and returns the raw integer.
    #[inline]
    pub fn into_raw(self) -> T {
        self.bits
    }

    /// Creates a bitboard from the raw integer, masking out upper bits.
    #[inline]
    pub fn from_raw(raw: T) -> Self {
        BitBoard {
            bits: raw & Self::mask(),
        }
    }

    /// Creates a bitboard from an iterator over `(x, y)` positions.
    pub fn from_cells<I>(iter: I) -> Result<Self, BitBoardError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut board = Self::new();
        for (x, y) in iter {
            board.set(x, y)?;
        }
        Ok(board)
    }

    /// Returns `true` if the two boards share at least one set cell.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.bits & other.bits).is_zero()
    }

    /// Every set cell together with its eight neighbours.
    ///
    /// Horizontal shifts mask out the column that would wrap onto the
    /// neighbouring row; vertical shifts drop off the board through
    /// [`from_raw`](Self::from_raw).
    pub fn dilate(&self) -> Self {
        let first = Self::column(0);
        let last = Self::column(N - 1);
        let row = self.bits | ((self.bits << 1) & !first) | ((self.bits >> 1) & !last);
        Self::from_raw(row | (row << N) | (row >> N))
    }

    /// Iterator over the set bits of the board as `(x, y)`.
    #[inline]
    pub fn iter_set_bits(&self) -> SetBits<'_, T, N> {
        SetBits {
            board: self,
            idx: 0,
        }
    }
}

impl<T, const N: usize> Default for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitBoard<{}, {}>:", any::type_name::<T>(), N)?;
        writeln!(f, "{}", self)
    }
}

impl<T, const N: usize> fmt::Display for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..N {
            for x in 0..N {
                let bit = if self.contains(x, y) { '■' } else { '□' };
                write!(f, "{} ", bit)?;
            }
            if y + 1 < N {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Iterator over the set bits of a bitboard.
#[derive(Clone, Copy)]
pub struct SetBits<'a, T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    board: &'a BitBoard<T, N>,
    idx: usize,
}

impl<'a, T, const N: usize> Iterator for SetBits<'a, T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = (usize, usize);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < N * N {
            let idx = self.idx;
            self.idx += 1;
            if ((self.board.bits >> idx) & T::one()) != T::zero() {
                return Some((idx % N, idx / N));
            }
        }
        None
    }
}

impl<T, const N: usize> BitAnd for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits & rhs.bits)
    }
}

impl<T, const N: usize> BitOr for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits | rhs.bits)
    }
}

/// Complement within board bounds.
impl<T, const N: usize> Not for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        Self::from_raw(!self.bits)
    }
}

impl<T, const N: usize> BitAndAssign for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits = self.bits & rhs.bits;
    }
}

impl<T, const N: usize> BitOrAssign for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits = self.bits | rhs.bits;
    }
}
