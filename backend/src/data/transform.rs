use std::ops::Mul;

use once_cell::sync::OnceCell;

use super::euclid;
use super::prelude::*;

type Matrix = euclid::Transform2D<f32, WorldSpace, WorldSpace>;

/// 2D affine transform `[x'; y'] = [[a, b], [c, d]] * [x; y] + [e; f]`.
///
/// The inverse is computed on first use and cached. A singular transform inverts to the
/// identity.
#[derive(Debug)]
pub struct Transform2D {
    matrix: Matrix,
    inverse: OnceCell<Matrix>,
}

impl Transform2D {
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        // euclid works on row vectors, so its m12 is our c and m21 is our b
        Self::from_matrix(Matrix::new(a, c, b, d, e, f))
    }

    fn from_matrix(matrix: Matrix) -> Self {
        Self { matrix, inverse: OnceCell::new() }
    }

    pub fn identity() -> Self {
        Self::from_matrix(Matrix::identity())
    }

    pub fn translation(dx: f32, dy: f32) -> Self {
        Self::from_matrix(Matrix::translation(dx, dy))
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::from_matrix(Matrix::scale(sx, sy))
    }

    /// Counter-clockwise rotation about the origin.
    pub fn rotation(radians: f32) -> Self {
        Self::from_matrix(Matrix::rotation(euclid::Angle::radians(radians)))
    }

    /// Coefficients in `(a, b, c, d, e, f)` order.
    pub fn coefficients(&self) -> [f32; 6] {
        let m = &self.matrix;
        [m.m11, m.m21, m.m12, m.m22, m.m31, m.m32]
    }

    pub fn determinant(&self) -> f32 {
        self.matrix.determinant()
    }

    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix::identity()
    }

    pub fn transform(&self, point: WorldPoint) -> WorldPoint {
        self.matrix.transform_point(point)
    }

    /// Applies only the linear part, for direction vectors.
    pub fn linear_transform(&self, vector: WorldVector) -> WorldVector {
        self.matrix.transform_vector(vector)
    }

    pub fn inverse(&self) -> Transform2D {
        let inverse = *self.inverse.get_or_init(|| {
            self.matrix.inverse().unwrap_or_else(|| {
                log::trace!("singular transform {:?} inverted to identity", self.coefficients());
                Matrix::identity()
            })
        });
        Transform2D::from_matrix(inverse)
    }

    /// `translate(center) * self * translate(-center)`: pivots the transform about `center`.
    pub fn localize(&self, center: WorldPoint) -> Transform2D {
        &(&Transform2D::translation(center.x, center.y) * self)
            * &Transform2D::translation(-center.x, -center.y)
    }

    pub fn approx_eq(&self, other: &Transform2D, epsilon: f32) -> bool {
        self.coefficients()
            .iter()
            .zip(other.coefficients().iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Clone for Transform2D {
    fn clone(&self) -> Self {
        Self { matrix: self.matrix, inverse: self.inverse.clone() }
    }
}

impl PartialEq for Transform2D {
    fn eq(&self, other: &Self) -> bool {
        self.matrix == other.matrix
    }
}

/// `t1 * t2` applies `t2` first, then `t1`.
impl<'a, 'b> Mul<&'b Transform2D> for &'a Transform2D {
    type Output = Transform2D;

    fn mul(self, rhs: &'b Transform2D) -> Transform2D {
        Transform2D::from_matrix(rhs.matrix.then(&self.matrix))
    }
}

impl Mul for Transform2D {
    type Output = Transform2D;

    fn mul(self, rhs: Transform2D) -> Transform2D {
        &self * &rhs
    }
}

/// Running product of pushed transforms, used while walking the scene graph.
#[derive(Debug, Clone, Default)]
pub struct Transform2DStack {
    products: Vec<Transform2D>,
    identity: Transform2D,
}

impl Transform2DStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transform: &Transform2D) {
        let product = self.current() * transform;
        self.products.push(product);
    }

    /// Removes the most recent push, returning the product it had produced.
    pub fn pop(&mut self) -> Option<Transform2D> {
        self.products.pop()
    }

    pub fn current(&self) -> &Transform2D {
        self.products.last().unwrap_or(&self.identity)
    }

    pub fn depth(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
