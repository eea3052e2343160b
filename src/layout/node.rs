use super::{Cluster, Column, DrawContext, Group, Header, PlainTextGroup, Question, QuestionDetails};

/// Closed set of layout elements. Heights are fixed once a node is built;
/// drawing only reads them.
#[derive(Clone, Debug)]
pub enum VisualNode {
    Question(Question),
    QuestionDetails(QuestionDetails),
    Group(Group),
    PlainTextGroup(PlainTextGroup),
    Cluster(Cluster),
    Column(Column),
    Header(Header),
}

impl VisualNode {
    pub fn height(&self) -> f32 {
        match self {
            VisualNode::Question(n) => n.height(),
            VisualNode::QuestionDetails(n) => n.height(),
            VisualNode::Group(n) => n.height(),
            VisualNode::PlainTextGroup(n) => n.height(),
            VisualNode::Cluster(n) => n.height(),
            VisualNode::Column(n) => n.height(),
            VisualNode::Header(n) => n.height(),
        }
    }

    /// Place the node with its top-left corner at `(x, y)`. `width` is the
    /// horizontal space granted by the parent; plain text ignores it.
    pub fn draw(&self, ctx: &mut DrawContext, x: f32, y: f32, width: f32) {
        match self {
            VisualNode::Question(n) => n.draw(ctx, x, y, width),
            VisualNode::QuestionDetails(n) => n.draw(ctx, x, y, width),
            VisualNode::Group(n) => n.draw(ctx, x, y, width),
            VisualNode::PlainTextGroup(n) => n.draw(ctx, x, y),
            VisualNode::Cluster(n) => n.draw(ctx, x, y, width),
            VisualNode::Column(n) => n.draw(ctx, x, y, width),
            VisualNode::Header(n) => n.draw(ctx, x, y, width),
        }
    }
}
