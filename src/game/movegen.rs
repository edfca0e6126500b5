//! Legal move generation. Pure functions over a [`Board`].

use super::board::Board;

/// Legal columns in ascending order.
pub fn legal_moves(board: &Board) -> Vec<usize> {
    (0..board.columns())
        .filter(|&col| !board.is_column_full(col))
        .collect()
}

/// Legal columns in center-out order, for better alpha-beta pruning and
/// reproducible tie-breaking.
pub fn ordered_moves(board: &Board) -> Vec<usize> {
    center_out_order(board.columns())
        .into_iter()
        .filter(|&col| !board.is_column_full(col))
        .collect()
}

/// All columns sorted by distance from the center, left before right on ties.
///
/// For seven columns this is `[3, 2, 4, 1, 5, 0, 6]`.
pub fn center_out_order(columns: usize) -> Vec<usize> {
    let center = columns / 2;
    let mut order: Vec<usize> = (0..columns).collect();
    order.sort_by_key(|&col| (col.abs_diff(center), col));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Player;

    #[test]
    fn test_center_out_order_seven_columns() {
        assert_eq!(center_out_order(7), vec![3, 2, 4, 1, 5, 0, 6]);
    }

    #[test]
    fn test_center_out_order_even_columns() {
        assert_eq!(center_out_order(6), vec![3, 2, 4, 1, 5, 0]);
        assert_eq!(center_out_order(1), vec![0]);
    }

    #[test]
    fn test_empty_board_all_columns_legal() {
        let board = Board::new();
        assert_eq!(legal_moves(&board), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(ordered_moves(&board), vec![3, 2, 4, 1, 5, 0, 6]);
    }

    #[test]
    fn test_full_columns_excluded() {
        let mut board = Board::new();
        for _ in 0..board.rows() {
            board.drop_mut(3, Player::One).unwrap();
            board.drop_mut(0, Player::Two).unwrap();
        }
        assert_eq!(legal_moves(&board), vec![1, 2, 4, 5, 6]);
        assert_eq!(ordered_moves(&board), vec![2, 4, 1, 5, 6]);
    }

    #[test]
    fn test_single_open_column() {
        let mut board = Board::new();
        for col in (0..board.columns()).filter(|&c| c != 5) {
            for _ in 0..board.rows() {
                board.drop_mut(col, Player::One).unwrap();
            }
        }
        assert_eq!(legal_moves(&board), vec![5]);
        assert_eq!(ordered_moves(&board), vec![5]);
    }

    #[test]
    fn test_same_set_in_both_orders() {
        let mut board = Board::new();
        board.drop_mut(1, Player::One).unwrap();
        let mut ordered = ordered_moves(&board);
        ordered.sort_unstable();
        assert_eq!(ordered, legal_moves(&board));
    }
}
