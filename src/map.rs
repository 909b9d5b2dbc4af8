use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use arrayvec::ArrayVec;

use crate::grid::{MAX_SIZE, Position};

pub const MAX_BOXES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Goal,
}

/// Error type for level construction.
#[derive(Debug)]
pub enum MapError {
    /// IO error when reading from file
    Io(io::Error),
    /// Level text contains no lines
    Empty,
    /// Level exceeds the supported grid size
    TooLarge { width: usize, height: usize },
    /// More boxes or goals than the solver supports
    TooManyBoxes { count: usize },
    /// Character outside the level alphabet
    InvalidCharacter { ch: char, x: usize, y: usize },
    /// No keeper on the level
    MissingKeeper,
    /// More than one keeper on the level
    MultipleKeepers,
    /// Box and goal counts differ
    CountMismatch { boxes: usize, goals: usize },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io(err) => write!(f, "IO error: {}", err),
            MapError::Empty => write!(f, "Empty level"),
            MapError::TooLarge { width, height } => write!(
                f,
                "Level size {}x{} exceeds maximum size {}",
                width, height, MAX_SIZE
            ),
            MapError::TooManyBoxes { count } => {
                write!(f, "{} boxes exceed the maximum of {}", count, MAX_BOXES)
            }
            MapError::InvalidCharacter { ch, x, y } => {
                write!(f, "Invalid character '{}' at position ({}, {})", ch, x, y)
            }
            MapError::MissingKeeper => write!(f, "No keeper found on level"),
            MapError::MultipleKeepers => write!(f, "Multiple keepers found"),
            MapError::CountMismatch { boxes, goals } => write!(
                f,
                "Goal count ({}) does not match box count ({})",
                goals, boxes
            ),
        }
    }
}

impl Error for MapError {}

impl From<io::Error> for MapError {
    fn from(err: io::Error) -> Self {
        MapError::Io(err)
    }
}

/// Immutable snapshot of a level: the static grid plus the initial box and
/// keeper placement. Nothing here changes during a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    tiles: [[Tile; MAX_SIZE]; MAX_SIZE],
    width: u8,
    height: u8,
    keeper: Position,
    boxes: ArrayVec<Position, MAX_BOXES>,
    goals: ArrayVec<Position, MAX_BOXES>,
}

impl Map {
    /// Parse a level from text.
    ///
    /// Characters:
    /// - `#` = Wall
    /// - ` ` or `-` = Floor (empty space)
    /// - `.` = Goal (target location for boxes)
    /// - `$` = Box
    /// - `*` = Box on goal
    /// - `@` = Keeper
    /// - `+` = Keeper on goal
    pub fn from_text(text: &str) -> Result<Self, MapError> {
        let lines: Vec<&str> = text.lines().collect();

        if lines.is_empty() {
            return Err(MapError::Empty);
        }

        let height = lines.len();
        let width = lines.iter().map(|line| line.len()).max().unwrap_or(0);

        if width > MAX_SIZE || height > MAX_SIZE {
            return Err(MapError::TooLarge { width, height });
        }

        let mut tiles = [[Tile::Floor; MAX_SIZE]; MAX_SIZE];
        let mut keeper = None;
        let mut boxes = ArrayVec::new();
        let mut goals = ArrayVec::new();

        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let pos = Position(x as u8, y as u8);
                match ch {
                    '#' => tiles[y][x] = Tile::Wall,
                    ' ' | '-' => tiles[y][x] = Tile::Floor,
                    '.' => {
                        tiles[y][x] = Tile::Goal;
                        push_bounded(&mut goals, pos)?;
                    }
                    '$' => {
                        tiles[y][x] = Tile::Floor;
                        push_bounded(&mut boxes, pos)?;
                    }
                    '*' => {
                        tiles[y][x] = Tile::Goal;
                        push_bounded(&mut goals, pos)?;
                        push_bounded(&mut boxes, pos)?;
                    }
                    '@' => {
                        tiles[y][x] = Tile::Floor;
                        if keeper.is_some() {
                            return Err(MapError::MultipleKeepers);
                        }
                        keeper = Some(pos);
                    }
                    '+' => {
                        tiles[y][x] = Tile::Goal;
                        if keeper.is_some() {
                            return Err(MapError::MultipleKeepers);
                        }
                        keeper = Some(pos);
                        push_bounded(&mut goals, pos)?;
                    }
                    _ => {
                        return Err(MapError::InvalidCharacter { ch, x, y });
                    }
                }
            }
        }

        let Some(keeper) = keeper else {
            return Err(MapError::MissingKeeper);
        };

        if goals.len() != boxes.len() {
            return Err(MapError::CountMismatch {
                boxes: boxes.len(),
                goals: goals.len(),
            });
        }

        Ok(Map {
            tiles,
            width: width as u8,
            height: height as u8,
            keeper,
            boxes,
            goals,
        })
    }

    /// Load a level from a text file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(contents.trim_matches('\n'))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn size(&self) -> (u8, u8) {
        (self.width, self.height)
    }

    pub fn tile(&self, pos: Position) -> Tile {
        self.tiles[pos.1 as usize][pos.0 as usize]
    }

    /// A wall, or anything outside the grid.
    pub fn is_blocked(&self, pos: Position) -> bool {
        pos.0 >= self.width || pos.1 >= self.height || self.tile(pos) == Tile::Wall
    }

    pub fn is_goal(&self, pos: Position) -> bool {
        pos.0 < self.width && pos.1 < self.height && self.tile(pos) == Tile::Goal
    }

    pub fn keeper(&self) -> Position {
        self.keeper
    }

    pub fn boxes(&self) -> &[Position] {
        &self.boxes
    }

    pub fn goals(&self) -> &[Position] {
        &self.goals
    }

    /// Every in-bounds cell that is not a wall, in scan order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .map(move |x| Position(x, y))
                .filter(|&pos| !self.is_blocked(pos))
        })
    }
}

fn push_bounded(
    list: &mut ArrayVec<Position, MAX_BOXES>,
    pos: Position,
) -> Result<(), MapError> {
    if list.is_full() {
        return Err(MapError::TooManyBoxes {
            count: list.len() + 1,
        });
    }
    list.push(pos);
    Ok(())
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let mut line = String::new();
            for x in 0..self.width {
                let pos = Position(x, y);
                let tile = self.tile(pos);
                let has_box = self.boxes.contains(&pos);

                let ch = if pos == self.keeper {
                    match tile {
                        Tile::Goal => '+',
                        _ => '@',
                    }
                } else if has_box {
                    match tile {
                        Tile::Goal => '*',
                        _ => '$',
                    }
                } else {
                    match tile {
                        Tile::Wall => '#',
                        Tile::Floor => ' ',
                        Tile::Goal => '.',
                    }
                };
                line.push(ch);
            }
            // Trim trailing spaces to match original input format
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
