// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The tensor container that expressions read from and assign into.

use crate::{ExprError, Shape};
use blas_engine::{DType, Device, Element};
use std::marker::PhantomData;

/// An owned, rank-`DIM` tensor of `T` living on device `D`.
///
/// # Memory Layout
/// Data is stored row-major. The tensor is viewed as `rows x cols` where
/// `cols` is the lowest extent and `rows` the product of all outer
/// extents; consecutive rows start `stride` elements apart. A stride
/// larger than `cols` leaves padding at the end of every row, which the
/// evaluators skip and never write.
#[derive(Debug, Clone)]
pub struct Tensor<D: Device, const DIM: usize, T: Element> {
    shape: Shape<DIM>,
    stride: usize,
    data: Vec<T>,
    _device: PhantomData<D>,
}

impl<D: Device, const DIM: usize, T: Element> Tensor<D, DIM, T> {
    /// Creates a dense tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_expr::{Cpu, Shape, Tensor};
    /// let t = Tensor::<Cpu, 2, f32>::zeros(Shape::matrix(2, 3));
    /// assert_eq!(t.stride(), 3);
    /// assert_eq!(t.data().len(), 6);
    /// ```
    pub fn zeros(shape: Shape<DIM>) -> Self {
        let stride = shape.lowest();
        Self::alloc(shape, stride)
    }

    /// Creates a zero-filled tensor whose rows are `stride` elements apart.
    ///
    /// Returns an error if `stride` is shorter than the lowest extent.
    pub fn with_stride(shape: Shape<DIM>, stride: usize) -> Result<Self, ExprError> {
        let cols = shape.lowest();
        if stride < cols {
            return Err(ExprError::InvalidStride { stride, cols });
        }
        Ok(Self::alloc(shape, stride))
    }

    fn alloc(shape: Shape<DIM>, stride: usize) -> Self {
        let (rows, _) = shape.flat_2d();
        Self {
            shape,
            stride,
            data: vec![T::ZERO; rows * stride],
            _device: PhantomData,
        }
    }

    /// Creates a dense tensor taking ownership of `data`.
    ///
    /// Returns an error if `data.len()` differs from `shape.num_elements()`.
    pub fn from_vec(shape: Shape<DIM>, data: Vec<T>) -> Result<Self, ExprError> {
        let expected = shape.num_elements();
        if data.len() != expected {
            return Err(ExprError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape,
            stride: shape.lowest(),
            data,
            _device: PhantomData,
        })
    }

    /// Creates a dense tensor by copying `values`.
    ///
    /// # Examples
    /// ```
    /// use tensor_expr::{Cpu, Shape, Tensor};
    /// let t = Tensor::<Cpu, 1, f64>::from_slice(Shape::vector(3), &[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.to_vec(), vec![1.0, 2.0, 3.0]);
    /// ```
    pub fn from_slice(shape: Shape<DIM>, values: &[T]) -> Result<Self, ExprError> {
        Self::from_vec(shape, values.to_vec())
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape<DIM> {
        &self.shape
    }

    /// Number of elements between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element type tag.
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Returns the raw buffer, padding included.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the raw buffer mutably, padding included.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Returns the element at `index`, or `None` if any coordinate is out
    /// of bounds.
    pub fn get(&self, index: [usize; DIM]) -> Option<T> {
        if index.iter().zip(self.shape.dims()).any(|(i, d)| i >= d) {
            return None;
        }
        let Some((&x, outer)) = index.split_last() else {
            return self.data.first().copied();
        };
        let y = outer
            .iter()
            .zip(self.shape.dims())
            .fold(0, |acc, (&i, &d)| acc * d + i);
        self.data.get(y * self.stride + x).copied()
    }

    /// Copies the logical elements out in row-major order, dropping any
    /// row padding.
    pub fn to_vec(&self) -> Vec<T> {
        let (rows, cols) = self.shape.flat_2d();
        if cols == 0 {
            return Vec::new();
        }
        self.data
            .chunks(self.stride)
            .take(rows)
            .flat_map(|row| row[..cols].iter().copied())
            .collect()
    }

    /// Sets every element, padding included, to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|x| *x = value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blas_engine::Cpu;

    #[test]
    fn test_zeros() {
        let t = Tensor::<Cpu, 2, f32>::zeros(Shape::matrix(2, 3));
        assert_eq!(t.shape(), &Shape::matrix(2, 3));
        assert_eq!(t.dtype(), DType::F32);
        assert!(t.data().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        let result = Tensor::<Cpu, 2, f32>::from_vec(Shape::matrix(2, 3), vec![0.0; 5]);
        assert!(matches!(
            result,
            Err(ExprError::BufferSizeMismatch {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_with_stride_pads_rows() {
        let t = Tensor::<Cpu, 2, f64>::with_stride(Shape::matrix(2, 3), 4).unwrap();
        assert_eq!(t.stride(), 4);
        assert_eq!(t.data().len(), 8);
        assert_eq!(t.to_vec().len(), 6);
    }

    #[test]
    fn test_with_stride_rejects_short_stride() {
        let result = Tensor::<Cpu, 2, f64>::with_stride(Shape::matrix(2, 3), 2);
        assert!(matches!(
            result,
            Err(ExprError::InvalidStride { stride: 2, cols: 3 })
        ));
    }

    #[test]
    fn test_get() {
        let t = Tensor::<Cpu, 3, f32>::from_vec(
            Shape::new([2, 2, 2]),
            (0..8).map(|v| v as f32).collect(),
        )
        .unwrap();
        assert_eq!(t.get([0, 0, 0]), Some(0.0));
        assert_eq!(t.get([1, 0, 1]), Some(5.0));
        assert_eq!(t.get([1, 1, 1]), Some(7.0));
        assert_eq!(t.get([2, 0, 0]), None);
    }

    #[test]
    fn test_get_skips_padding() {
        let mut t = Tensor::<Cpu, 2, f32>::with_stride(Shape::matrix(2, 2), 3).unwrap();
        t.data_mut().copy_from_slice(&[1.0, 2.0, -1.0, 3.0, 4.0, -1.0]);
        assert_eq!(t.get([1, 0]), Some(3.0));
        assert_eq!(t.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_fill() {
        let mut t = Tensor::<Cpu, 1, f64>::zeros(Shape::vector(5));
        t.fill(3.5);
        assert!(t.to_vec().iter().all(|&x| x == 3.5));
    }
}
