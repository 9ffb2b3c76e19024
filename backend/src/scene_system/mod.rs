//! The scene graph and the passes that turn it into pixels.

pub mod objects;
pub mod pipeline;

use crate::data::prelude::*;

/// A drawable node. Geometry lives in the object's local space, the transform stack resolves
/// it to world space while a [`PrimitiveCollector`] walks the tree.
pub trait Object2D {
    fn name(&self) -> &str;

    fn transform(&self) -> &Transform2D;
    fn transform_mut(&mut self) -> &mut Transform2D;

    /// Geometric center in local coordinates, the pivot the local transform works around.
    fn center(&self) -> WorldPoint;

    /// The local transform pivoted about [`Object2D::center`], then `global` on top of it.
    /// Only the local part is localized, so a global scale or rotation acts on the whole scene.
    fn aggregated_transform(&self, global: &Transform2D) -> Transform2D {
        global * &self.transform().localize(self.center())
    }

    fn emit(&self, collector: &mut PrimitiveCollector);

    fn children(&self) -> &[Box<dyn Object2D>] {
        &[]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

/// Root objects in insertion order, with the transform applied on top of every root.
///
/// Every mutation marks the stack dirty, the frame loop re-renders on the next tick.
pub struct Object2DStack {
    objects: DirtyFlag<Vec<(ObjectId, Box<dyn Object2D>)>>,
    global_transform: Transform2D,
    next_id: u64,
}

impl Object2DStack {
    pub fn new() -> Self {
        Self {
            objects: DirtyFlag::new_dirty(Vec::new()),
            global_transform: Transform2D::identity(),
            next_id: 0,
        }
    }

    pub fn add<O: Object2D + 'static>(&mut self, object: O) -> ObjectId {
        self.add_boxed(Box::new(object))
    }

    pub fn add_boxed(&mut self, object: Box<dyn Object2D>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.write().push((id, object));
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Box<dyn Object2D>> {
        let index = self.objects.read().iter().position(|(other, _)| *other == id)?;
        Some(self.objects.write().remove(index).1)
    }

    /// Swaps the object stored under `id`, keeping its place in the drawing order.
    pub fn replace(&mut self, id: ObjectId, object: Box<dyn Object2D>) -> Option<Box<dyn Object2D>> {
        let index = self.objects.read().iter().position(|(other, _)| *other == id)?;
        Some(std::mem::replace(&mut self.objects.write()[index].1, object))
    }

    pub fn clear(&mut self) {
        self.objects.write().clear();
    }

    pub fn get(&self, id: ObjectId) -> Option<&dyn Object2D> {
        self.objects.read().iter().find(|(other, _)| *other == id).map(|(_, object)| object.as_ref())
    }

    /// Mutable access, marks the stack dirty whether or not the object is then changed.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut (dyn Object2D + 'static)> {
        if !self.objects.read().iter().any(|(other, _)| *other == id) {
            return None;
        }
        self.objects.write().iter_mut().find(|(other, _)| *other == id).map(|(_, object)| object.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &dyn Object2D)> {
        self.objects.read().iter().map(|(id, object)| (*id, object.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn global_transform(&self) -> &Transform2D {
        &self.global_transform
    }

    pub fn set_global_transform(&mut self, transform: Transform2D) {
        self.global_transform = transform;
        self.objects.set_dirty();
    }

    pub fn is_dirty(&self) -> bool {
        self.objects.is_dirty()
    }

    /// Returns whether the stack changed since the last call, and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        self.objects.take_dirty()
    }

    pub fn set_dirty(&mut self) {
        self.objects.set_dirty();
    }
}

impl Default for Object2DStack {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Line,
    Point,
    Spline,
    Fill,
}

/// A primitive already resolved to world (pixel) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line(LineSegment),
    Point(PointPrimitive),
    Spline(SplinePrimitive),
    Fill(PolygonFill),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Line(_) => PrimitiveKind::Line,
            Primitive::Point(_) => PrimitiveKind::Point,
            Primitive::Spline(_) => PrimitiveKind::Spline,
            Primitive::Fill(_) => PrimitiveKind::Fill,
        }
    }
}

/// Pass-local sink objects emit into. Each emitted primitive is transformed by the current
/// stack product on arrival, primitives of other kinds than the one asked for are dropped.
pub struct PrimitiveCollector {
    stack: Transform2DStack,
    kind: Option<PrimitiveKind>,
    primitives: Vec<Primitive>,
}

impl PrimitiveCollector {
    /// Collects only `kind`, or everything for `None`.
    pub fn new(kind: Option<PrimitiveKind>) -> Self {
        Self { stack: Transform2DStack::new(), kind, primitives: Vec::new() }
    }

    pub fn accepts(&self, kind: PrimitiveKind) -> bool {
        self.kind.map_or(true, |wanted| wanted == kind)
    }

    pub fn current_transform(&self) -> &Transform2D {
        self.stack.current()
    }

    pub fn push_transform(&mut self, transform: &Transform2D) {
        self.stack.push(transform);
    }

    pub fn pop_transform(&mut self) {
        self.stack.pop();
    }

    pub fn add_line(&mut self, from: WorldPoint, to: WorldPoint, style: LineStyle) {
        if self.accepts(PrimitiveKind::Line) {
            let transform = self.stack.current();
            let (start, end) = (to_pixel(transform.transform(from)), to_pixel(transform.transform(to)));
            self.primitives.push(Primitive::Line(LineSegment::new(start, end, style)));
        }
    }

    pub fn add_point(&mut self, position: WorldPoint, style: PointStyle) {
        if self.accepts(PrimitiveKind::Point) {
            let position = to_pixel(self.stack.current().transform(position));
            self.primitives.push(Primitive::Point(PointPrimitive::new(position, style)));
        }
    }

    pub fn add_spline(&mut self, spline: &CubicSpline, style: SplineStyle) {
        if self.accepts(PrimitiveKind::Spline) {
            let spline = spline.transformed(self.stack.current());
            self.primitives.push(Primitive::Spline(SplinePrimitive::new(spline, style)));
        }
    }

    pub fn add_fill(&mut self, vertices: &[WorldPoint], style: FillStyle) {
        if self.accepts(PrimitiveKind::Fill) {
            let transform = self.stack.current();
            let vertices = vertices.iter().map(|v| transform.transform(*v)).collect();
            self.primitives.push(Primitive::Fill(PolygonFill::new(vertices, style)));
        }
    }

    /// Depth-first walk over every root of `stack`. Roots get the stack's global transform,
    /// children only their own, on top of their parent's product.
    pub fn collect(&mut self, stack: &Object2DStack, ignore_transforms: bool) {
        for (_, object) in stack.iter() {
            self.visit(object, stack.global_transform(), ignore_transforms);
        }
    }

    fn visit(&mut self, object: &dyn Object2D, global: &Transform2D, ignore_transforms: bool) {
        if !ignore_transforms {
            self.push_transform(&object.aggregated_transform(global));
        }

        object.emit(self);
        let identity = Transform2D::identity();
        for child in object.children() {
            self.visit(child.as_ref(), &identity, ignore_transforms);
        }

        if !ignore_transforms {
            self.pop_transform();
        }
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn into_primitives(self) -> Vec<Primitive> {
        self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
